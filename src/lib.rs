/*!

# Application-scoped Secret Service client

This crate is a protocol client for the
[freedesktop Secret Service](https://specifications.freedesktop.org/secret-service/),
the keyring daemon behind GNOME Keyring and KWallet. It stores,
retrieves, and deletes named secrets (passwords, tokens, API keys),
scoping every secret to an application identity. Storage, encryption at
rest, and access policy all live in the service; this crate implements
only the client side of the wire contract, over a
[zbus](https://crates.io/crates/zbus) connection.

## Attributes

Items in the secret service are organized into collections and are
identified by attributes. This client controls exactly two:

- `Application` (the application identity given at construction)
- `Id` (the label given to `set`/`get`/`delete`)

Every item it creates carries that pair and every lookup matches on it,
so two clients with different application identities never see each
other's secrets even when they use the same label. Items are created in
the default collection unless the config names another collection.

Each created item is also assigned a label property of the form
`{application}/{id}` for display in Secret Service UIs.

## Sessions and prompts

Secret payloads only travel inside a negotiated session; the client
opens one (plain algorithm) when it connects and closes it on
[`SecretClient::close`]. Unlocking the collection, and occasionally a
create or delete, may require interactive user consent: the service
hands back a prompt object and the outcome arrives asynchronously as a
completion signal. The client subscribes to that signal before
triggering the prompt, and bounds the wait with a configurable timeout
so a dropped prompt cannot hang a caller forever.

## Usage

```no_run
use secret_service_app_client::{ClientConfig, SecretClient};

# async fn demo() -> secret_service_app_client::Result<()> {
let mut client = SecretClient::connect(ClientConfig::new("my-app")).await?;
client.unlock().await?;
client.set("api_key", "secret123").await?;
assert_eq!(client.get("api_key").await?.as_deref(), Some("secret123"));
client.delete("api_key").await?;
client.close().await?;
# Ok(())
# }
```

## Headless usage

On a headless box there is usually no unlocked keyring and no agent to
answer prompts, so `unlock` will time out or be refused. Start the
keyring daemon unlocked with a known password (see the Python Keyring
docs, "Using Keyring on headless Linux systems") before running
anything that depends on this crate.

*/

pub mod client;
pub mod errors;
mod proto;

pub use client::{ClientConfig, SecretClient};
pub use errors::{Error, Result};
