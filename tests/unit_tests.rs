//! Unit-level tests exercising the public API of individual components.

mod unit;
