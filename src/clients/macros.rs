/// Generates one subscription accessor per stream held in the client's
/// `streams` field.
macro_rules! impl_stream_accessors {
    ($client:ident { $($(#[$doc:meta])* $stream:ident: $item:ty),* $(,)? }) => {
        impl $client {
            $(
                $(#[$doc])*
                #[tracing::instrument(skip(self))]
                pub fn $stream(&self) -> $crate::stream_framework::Subscription<$item> {
                    tracing::debug!("Subscribing");
                    self.streams.$stream.subscribe()
                }
            )*
        }
    };
}

/// Generates client methods that send a payload-free command to a service.
macro_rules! impl_client_commands {
    ($client:ident => $(fn $method:ident() as $request:ident::$variant:ident),* $(,)?) => {
        impl $client {
            $(
                #[tracing::instrument(skip(self))]
                pub async fn $method(&self) -> Result<(), $crate::error::CatalogError> {
                    tracing::debug!("Sending request");
                    self.sender
                        .send($request::$variant)
                        .await
                        .map_err(|_| $crate::error::CatalogError::ServiceClosed(stringify!($client).to_string()))
                }
            )*
        }
    };
}
