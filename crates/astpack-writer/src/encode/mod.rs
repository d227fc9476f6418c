//! Record encoders, one per entity family.
//!
//! Each encoder extends [`crate::session::Session`] with the methods that
//! write its records. Encoders never recurse into referenced types or
//! declarations; they reference them and let the work queues do the rest.

mod decls;
mod macros;
mod source_manager;
mod stmts;
mod types;

#[cfg(test)]
mod decls_tests;
#[cfg(test)]
mod types_tests;
