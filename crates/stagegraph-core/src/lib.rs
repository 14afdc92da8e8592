//! Stagegraph Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Stagegraph
//! dashboard crates. It includes:
//!
//! - **Identifiers**: String-interned node anchors ([`identifier::Id`])
//! - **Colors**: Color handling with CSS color support ([`color::Color`])
//! - **Geometry**: Points, sizes, bounds and insets ([`geometry`] module)
//! - **Draw**: Layered SVG drawing primitives for nodes, plates, connectors
//!   and overlay panels ([`draw`] module)

pub mod color;
pub mod draw;
pub mod geometry;
pub mod identifier;
