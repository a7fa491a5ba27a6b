//! Shared test harness modules for the BAL CLI.

use super::*;

mod helpers;
