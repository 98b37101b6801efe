//! Integration tests for the triple-if binary
//!
//! Each test spawns the compiled CLI and checks stdout, stderr and the exit
//! code.
