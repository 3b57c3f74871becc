//! Root crate facade for the FieldGrid server, session, and save client.

pub use fieldgrid_client as client;
pub use fieldgrid_core::{
    config, constants, db, grid, host, models, sanitize, session, sync, AppError, Config,
    Database, EditSession, FieldValue, MetaHost,
};
pub use fieldgrid_server::{
    create_app, error, handlers, run, serve_router, shutdown_signal, tokens, AppState,
    TokenRegistry,
};
