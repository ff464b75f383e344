//! Application exposes the [`Service`] as a GraphQL API.

#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod api;
pub mod args;
pub mod config;
mod context;
pub mod error;

use std::sync::Arc;

use axum::{
    extract::WebSocketUpgrade,
    response::{IntoResponse, Response},
    Extension, Json,
};
use derive_more::Debug;
use juniper::{http::GraphQLBatchResponse, DefaultScalarValue, ScalarValue};
use juniper_axum::{extract::JuniperRequest, subscriptions};
use juniper_graphql_ws::ConnectionConfig;
// Used in binary.
use axum_client_ip as _;
use tower_http as _;
use tracing_subscriber as _;

pub use self::{
    args::Args,
    config::Config,
    context::Context,
    error::{AsError, Error},
};

/// [`Service`] with filled infrastructure dependencies.
///
/// [`Service`]: service::Service
pub type Service =
    service::Service<service::infra::Memory, service::infra::Broadcast>;

/// [`juniper`] GraphQL response carrying the HTTP status of its errors.
#[derive(Debug)]
pub struct JuniperResponse<S = DefaultScalarValue>
where
    S: ScalarValue,
{
    /// Status code of the response.
    pub status_code: http::StatusCode,

    /// Underlying GraphQL response.
    #[debug(skip)]
    pub response: GraphQLBatchResponse<S>,
}

impl<S> IntoResponse for JuniperResponse<S>
where
    S: ScalarValue,
{
    fn into_response(self) -> Response {
        let Self {
            status_code,
            response,
        } = self;

        let status_code = if response.is_ok() {
            http::StatusCode::OK
        } else {
            status_code
        };
        (status_code, Json(response)).into_response()
    }
}

/// Maximum size of an incoming WebSocket message.
///
/// Enough for a `commentAdded` subscription along with its `authToken`.
const WS_MAX_INCOMING_SIZE: usize = 16 * 1024;

/// Maximum size of the outgoing WebSocket buffer.
///
/// Must fit a notification about a [`api::Comment`] of the maximum length.
const WS_MAX_OUTGOING_SIZE: usize = 128 * 1024;

/// Maximum number of subscriptions served over a single WebSocket.
const WS_MAX_SUBSCRIPTIONS: usize = 10;

/// Handler executing GraphQL queries and mutations over HTTP.
///
/// Failed responses carry the HTTP status of the last occurred [`Error`].
pub async fn graphql(
    Extension(schema): Extension<Arc<api::Schema>>,
    context: Context,
    JuniperRequest(gql_request): JuniperRequest,
) -> JuniperResponse {
    let response = gql_request.execute(&*schema, &context).await;
    JuniperResponse {
        status_code: context.error_status_code(),
        response,
    }
}

/// Handler serving GraphQL subscriptions over a WebSocket.
///
/// The `authToken` connection parameter authenticates the subscriber.
#[expect(
    clippy::unused_async,
    reason = "`async` is required to match signature"
)]
pub async fn subscriptions(
    Extension(schema): Extension<Arc<api::Schema>>,
    mut context: Context,
    ws: WebSocketUpgrade,
) -> Response {
    ws.protocols(["graphql-transport-ws", "graphql-ws"])
        .max_frame_size(WS_MAX_INCOMING_SIZE)
        .max_message_size(WS_MAX_INCOMING_SIZE)
        .max_write_buffer_size(WS_MAX_OUTGOING_SIZE)
        .on_upgrade(move |socket| {
            subscriptions::serve_ws(socket, schema, move |vars| async move {
                context.apply_subscription_variables(&vars).map(|()| {
                    ConnectionConfig::new(context)
                        .with_max_in_flight_operations(WS_MAX_SUBSCRIPTIONS)
                })
            })
        })
}
