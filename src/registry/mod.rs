// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Fleet registry — car records, schema bootstrap and the store handle.

pub mod car;
pub mod schema;
pub mod store;

pub use car::{Car, CarState, NewCar};
pub use store::FleetRegistry;
