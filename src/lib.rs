//! Rectangular regions of interest on a viewer's shapes layer.
//!
//! This crate lets a user draw, edit, name, and persist rectangular ROIs over
//! image data. The host viewer owns a generic shapes layer; this crate treats
//! that layer as an ordered, indexable, mutable collection of typed ROI
//! records, keeps its geometry and feature table consistent through inserts,
//! removals, and live drag edits, and mirrors it to a flat CSV file. The host
//! is responsible only for forwarding layer events and carrying out the
//! [`controller::Action`]s it is handed back.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`controller`] | Active-layer binding, drag handling, Add ROI, save/load |
//! | [`table`] | Five-column table model with edit validation |
//! | [`accessor`] | Layer-backed ROI collection and its live item views |
//! | [`layer`] | Host shapes-layer contract and an in-memory implementation |
//! | [`config`] | Per-layer configuration stored in layer metadata |
//! | [`csv_file`] | `Name,X,Y,W,H` ROI file reader and writer |
//! | [`geometry`] | Rectangle vertices to and from `(x, y, width, height)` |
//! | [`origin`] | Origin conventions for a rectangle's `(x, y)` |
//! | [`roi`] | ROI value type and read/write capability traits |
//! | [`input`] | Layer modes and the drag state machine |
//! | [`camera`] | Viewer camera center |
//! | [`consts`] | Feature, metadata and file constants |

pub mod accessor;
pub mod camera;
pub mod config;
pub mod consts;
pub mod controller;
pub mod csv_file;
pub mod geometry;
pub mod input;
pub mod layer;
pub mod origin;
pub mod roi;
pub mod table;
