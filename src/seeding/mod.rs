//! Seeding passes.
//!
//! A [`Seeder`] walks the configured sources for one context, feeds
//! whatever each of them yields into the PRNG and reports the result.
//! No individual source failure aborts a pass.

mod seeder;

pub use seeder::Seeder;
