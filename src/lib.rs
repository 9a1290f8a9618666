//! Point & Shoot: targeting geometry and capture state for web content.
//!
//! The engine computes on-screen regions for rendered content (through
//! nested scrolling frames, overflow, `clip` and `clip-path`, filtered to
//! meaningful content), runs the point → select → shoot → collect/dismiss
//! lifecycle over those regions, and converts a captured group's HTML into
//! ordered note items. The rendering engine, file storage, and note storage
//! stay outside and are reached through traits.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | State machine, [`engine::EngineCore`] and [`engine::Action`] |
//! | [`tracker`] | Per-frame pointed/shot/selected bookkeeping and notifications |
//! | [`notification`] | Frame → host messages |
//! | [`dom`] | [`dom::RenderTree`] accessor and the [`dom::DomStore`] arena |
//! | [`style`] | Parsing of clip, clip-path, overflow, position, background |
//! | [`visibility`] | Visibility and effective clipping per element |
//! | [`bounds`] | Meaningful-content bounds aggregation |
//! | [`frames`] | Frame registry and coordinate translation |
//! | [`target`] | Targets and shoot groups |
//! | [`shape`] | Union paths and shape caches |
//! | [`debounce`] | Burst coalescing for bounds refresh |
//! | [`capture`] | HTML → note items, downloads and storage seams |
//! | [`geom`] | Points, rects, clip areas |
//! | [`input`] | Modifier keys |
//! | [`config`] | Environment-driven configuration |
//! | [`error`] | Error enums and codes |
//! | [`consts`] | Shared numeric constants (timing windows, size limits) |

pub mod bounds;
pub mod capture;
pub mod config;
pub mod consts;
pub mod debounce;
pub mod dom;
pub mod engine;
pub mod error;
pub mod frames;
pub mod geom;
pub mod input;
pub mod notification;
pub mod shape;
pub mod style;
pub mod target;
pub mod tracker;
pub mod visibility;
