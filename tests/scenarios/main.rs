//! Scenario-based tests for etl-pipeline

mod helpers;

mod acme_run;
mod configuration;
mod parallel_steps;
mod timed_runner;
