//! CMS bootstrap: normalizes an entity schema, resolves which connector serves which
//! entity, assembles a single data client, and derives navigation state from locations.

pub mod client;
pub mod cms;
pub mod connector;
pub mod error;
pub mod handlers;
pub mod image;
pub mod provider;
pub mod response;
pub mod route;
pub mod routes;
pub mod schema;
pub mod settings;
pub mod state;

pub use client::{assemble_client, create_client, ClientOptions, DataClient, EntityResolvers, FieldResolver, ResolverMap};
pub use cms::{Cms, CmsOptions, ControlOutcome};
pub use connector::{
    ensure_database_exists, resolve_connectors, Connector, ConnectorSpec, MemoryConnector, PgConnector,
    ResolvedConnectors, SharedConnector, DEFAULT_CONNECTOR_KEY,
};
pub use error::{AppError, ConfigError};
pub use image::{distribute_image_configs, ImageService, ImgurService};
pub use provider::{DataChange, DeployReport, Provider};
pub use route::{derive_route, parse_query, Location, Navigation};
pub use routes::{common_routes, entity_routes, navigation_routes};
pub use schema::{create_empty_data, load_schema_from_path, normalize, EntityDefinition, EntitySchema, FieldKind};
pub use settings::Settings;
pub use state::AppState;
