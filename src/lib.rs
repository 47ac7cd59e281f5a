//! Client-side synchronization engine for a server-rendered microblogging
//! app: optimistic social actions with rollback, partial navigation with
//! history replay, and a uniform request gateway, all behind a page-surface
//! seam so the logic runs and tests headlessly.

pub mod action;
pub mod app;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod gateway;
pub mod nav;
pub mod notify;
pub mod page;
