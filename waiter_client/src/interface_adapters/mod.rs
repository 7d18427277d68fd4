// Interface adapters: wire protocol, push channel transport, notifiers and HTTP clients.

pub mod clients;
pub mod notifier;
pub mod protocol;
pub mod ws_channel;
