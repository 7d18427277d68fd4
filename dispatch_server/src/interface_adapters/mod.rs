// Interface adapters: HTTP handlers, the staff WebSocket, routes and wire DTOs.

pub mod handlers;
pub mod net;
pub mod protocol;
pub mod routes;
pub mod state;
