//! Expression reduction over a congruence-closed structure: the token-stream
//! [`Simplifier`] for ground terms, and the interval [`interval::Approximator`]/propagator for
//! partially-ground ones.

pub mod interval;
mod simplifier;

pub use simplifier::{NoRoutes, Reduced, RouteTable, Simplifier, SEMI_FALSE, SEMI_TRUE};
