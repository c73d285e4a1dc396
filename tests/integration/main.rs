//! Integration tests for the batch pipeline

mod support;

mod pipeline_test;
mod retrieve_test;
