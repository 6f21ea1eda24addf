//! Unit tests for configuration loading and precedence.
//!
//! Tests are organised into modules by functional area:
//! - `precedence`: Layer precedence tests
//! - `operation_mode`: Operation mode and schedule tests
//! - `field_resolution`: Token and command resolution tests
