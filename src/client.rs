/*!

The Secret Service protocol client.

A [`SecretClient`] owns one bus connection and one negotiated session
for its whole lifetime. Data operations resolve a label to an item path
via an attribute search, then act on that path. Unlocking, and any
create or delete the service wants confirmed, may hand back a prompt
object whose outcome arrives asynchronously; the client drives that
handshake, always subscribing to the completion signal before issuing
the trigger call so the signal cannot be missed.

Operations take `&mut self`, so one client instance has at most one
RPC in flight at a time. The client is `Send`; wrap it in a mutex or a
single-owner task to share it.

*/

use std::collections::HashMap;
use std::time::Duration;

use futures_util::StreamExt;
use serde::Serialize;
use tracing::debug;
use zbus::zvariant::{DynamicType, OwnedObjectPath, OwnedValue, Value};
use zbus::{Connection, MatchRule, Message, MessageStream, message};

use crate::errors::{Error, Result};
use crate::proto;

const DEFAULT_PROMPT_TIMEOUT: Duration = Duration::from_secs(120);

/// Construction-time identity and tuning for a [`SecretClient`].
#[derive(Clone, Debug)]
pub struct ClientConfig {
    application: String,
    collection: Option<String>,
    prompt_timeout: Duration,
}

impl ClientConfig {
    /// A config for the given application identity, targeting the
    /// default collection.
    pub fn new(application: impl Into<String>) -> Self {
        Self {
            application: application.into(),
            collection: None,
            prompt_timeout: DEFAULT_PROMPT_TIMEOUT,
        }
    }

    /// Target a named collection instead of the default alias.
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.collection = Some(name.into());
        self
    }

    /// Bound every confirmation wait. An interactive prompt has no
    /// protocol-level timeout, so this is the only thing standing
    /// between a dropped prompt and an indefinite hang.
    pub fn prompt_timeout(mut self, timeout: Duration) -> Self {
        self.prompt_timeout = timeout;
        self
    }
}

/// A session-scoped client for one application identity against one
/// secret collection.
///
/// Lifecycle: [`connect`](Self::connect) → [`unlock`](Self::unlock) →
/// data operations → [`close`](Self::close). Construction failure
/// yields no client; `close` consumes the client, so a closed client
/// cannot be called again.
pub struct SecretClient {
    connection: Connection,
    session: OwnedObjectPath,
    collection: OwnedObjectPath,
    application: String,
    prompt_timeout: Duration,
    unlocked: bool,
}

impl SecretClient {
    /// Connect to the session bus and negotiate a session with the
    /// secret service.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let connection = Connection::session().await?;
        Self::connect_with(connection, config).await
    }

    /// Negotiate a session over an existing bus connection.
    ///
    /// Performs the OpenSession exchange with the plain algorithm and
    /// an empty negotiation input.
    pub async fn connect_with(connection: Connection, config: ClientConfig) -> Result<Self> {
        let collection = proto::collection_path(config.collection.as_deref())?;
        let destination = if connection.is_bus() {
            Some(proto::BUS_NAME)
        } else {
            None
        };
        let reply = connection
            .call_method(
                destination,
                proto::SERVICE_PATH,
                Some(proto::SERVICE_IFACE),
                proto::OPEN_SESSION,
                &(proto::ALGORITHM_PLAIN, Value::from("")),
            )
            .await?;
        let (_output, session): (OwnedValue, OwnedObjectPath) = reply.body().deserialize()?;
        debug!(session = %session, collection = %collection, "session opened");
        Ok(Self {
            connection,
            session,
            collection,
            application: config.application,
            prompt_timeout: config.prompt_timeout,
            unlocked: false,
        })
    }

    /// The application identity this client scopes its items to.
    pub fn application(&self) -> &str {
        &self.application
    }

    /// Whether the last unlock attempt succeeded. This is a local
    /// cache of the last outcome; the service stays authoritative.
    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Unlock the collection this client targets.
    ///
    /// If the service cannot unlock synchronously it returns a prompt
    /// object; the user's decision arrives through the prompt
    /// handshake. Dismissal surfaces as [`Error::Dismissed`] and a
    /// rejection without a prompt as [`Error::Refused`]; in both cases
    /// the client stays locked. No automatic retry.
    pub async fn unlock(&mut self) -> Result<()> {
        let targets = vec![self.collection.clone()];
        let reply = self
            .call(proto::SERVICE_PATH, proto::SERVICE_IFACE, proto::UNLOCK, &targets)
            .await?;
        let (unlocked, prompt): (Vec<OwnedObjectPath>, OwnedObjectPath) =
            reply.body().deserialize()?;
        if unlocked.iter().any(|path| *path == self.collection) {
            debug!(collection = %self.collection, "collection unlocked synchronously");
            self.unlocked = true;
            return Ok(());
        }
        if prompt.as_str() == proto::NO_PROMPT {
            return Err(Error::Refused);
        }
        self.await_prompt(&prompt).await?;
        debug!(collection = %self.collection, "collection unlocked after prompt");
        self.unlocked = true;
        Ok(())
    }

    /// Store `value` under `label`, overwriting any existing secret
    /// this application holds under that label.
    ///
    /// The value travels as UTF-8 text with content type
    /// `text/plain; charset=utf8`. If the service wants the write
    /// confirmed it returns a prompt, and the same handshake as in
    /// [`unlock`](Self::unlock) runs before success is reported.
    pub async fn set(&mut self, label: &str, value: &str) -> Result<()> {
        self.ensure_unlocked()?;
        let replace = self.search(label).await?.is_some();
        let display_label = format!("{}/{}", self.application, label);
        let attributes = proto::lookup_attributes(&self.application, label);
        let properties: HashMap<&str, Value<'_>> = HashMap::from([
            (proto::ITEM_LABEL_PROP, Value::from(display_label)),
            (proto::ITEM_ATTRIBUTES_PROP, Value::from(attributes)),
        ]);
        let secret = proto::Secret {
            session: self.session.clone(),
            parameters: Vec::new(),
            value: value.as_bytes().to_vec(),
            content_type: proto::CONTENT_TYPE_TEXT.to_string(),
        };
        let reply = self
            .call(
                self.collection.as_str(),
                proto::COLLECTION_IFACE,
                proto::CREATE_ITEM,
                &(properties, secret, replace),
            )
            .await?;
        let (item, prompt): (OwnedObjectPath, OwnedObjectPath) = reply.body().deserialize()?;
        if prompt.as_str() != proto::NO_PROMPT {
            self.await_prompt(&prompt).await?;
        }
        debug!(item = %item, replace, "item stored");
        Ok(())
    }

    /// Retrieve the secret stored under `label`, or `None` if this
    /// application holds nothing under that label.
    ///
    /// When several items match the lookup attributes the first one in
    /// service order wins; the client does not re-rank and does not
    /// treat duplicates as an error. The payload is decoded with
    /// [`String::from_utf8_lossy`]: a value that was stored as
    /// non-UTF-8 bytes by another writer comes back with replacement
    /// characters rather than failing the read.
    pub async fn get(&mut self, label: &str) -> Result<Option<String>> {
        self.ensure_unlocked()?;
        let Some(item) = self.search(label).await? else {
            return Ok(None);
        };
        let reply = self
            .call(item.as_str(), proto::ITEM_IFACE, proto::GET_SECRET, &self.session)
            .await?;
        let secret: proto::Secret = reply.body().deserialize()?;
        debug!(item = %item, bytes = secret.value.len(), "secret read");
        Ok(Some(String::from_utf8_lossy(&secret.value).into_owned()))
    }

    /// Delete the secret stored under `label`.
    ///
    /// Returns [`Error::NoEntry`] when nothing is stored under the
    /// label, which is distinct from a failed delete call. A prompt
    /// returned by the service is driven to completion before success
    /// is reported.
    pub async fn delete(&mut self, label: &str) -> Result<()> {
        self.ensure_unlocked()?;
        let Some(item) = self.search(label).await? else {
            return Err(Error::NoEntry);
        };
        let reply = self
            .call(item.as_str(), proto::ITEM_IFACE, proto::DELETE, &())
            .await?;
        let prompt: OwnedObjectPath = reply.body().deserialize()?;
        if prompt.as_str() != proto::NO_PROMPT {
            self.await_prompt(&prompt).await?;
        }
        debug!(item = %item, "item deleted");
        Ok(())
    }

    /// Close the session and release the connection.
    ///
    /// The connection is dropped when the consumed client goes out of
    /// scope, so the transport is released even if the Close call
    /// itself fails.
    pub async fn close(self) -> Result<()> {
        self.call(self.session.as_str(), proto::SESSION_IFACE, proto::CLOSE, &())
            .await?;
        debug!(session = %self.session, "session closed");
        Ok(())
    }

    fn ensure_unlocked(&self) -> Result<()> {
        if self.unlocked { Ok(()) } else { Err(Error::Locked) }
    }

    /// Resolve a label to an item path via the attribute search.
    ///
    /// Searches at the service level; unlocked matches are preferred
    /// and locked ones chained after, first match wins. Locked matches
    /// are unlocked before they are handed out, so a cross-collection
    /// duplicate stays readable.
    async fn search(&self, label: &str) -> Result<Option<OwnedObjectPath>> {
        let attributes = proto::lookup_attributes(&self.application, label);
        let reply = self
            .call(proto::SERVICE_PATH, proto::SERVICE_IFACE, proto::SEARCH_ITEMS, &attributes)
            .await?;
        let (unlocked, locked): (Vec<OwnedObjectPath>, Vec<OwnedObjectPath>) =
            reply.body().deserialize()?;
        debug!(label, unlocked = unlocked.len(), locked = locked.len(), "search finished");
        if !locked.is_empty() {
            self.unlock_items(&locked).await?;
        }
        Ok(unlocked.into_iter().chain(locked).next())
    }

    /// Unlock items that matched a search while locked, driving a
    /// prompt if the service requires one.
    async fn unlock_items(&self, items: &[OwnedObjectPath]) -> Result<()> {
        let reply = self
            .call(proto::SERVICE_PATH, proto::SERVICE_IFACE, proto::UNLOCK, &items.to_vec())
            .await?;
        let (_unlocked, prompt): (Vec<OwnedObjectPath>, OwnedObjectPath) =
            reply.body().deserialize()?;
        if prompt.as_str() != proto::NO_PROMPT {
            self.await_prompt(&prompt).await?;
        }
        Ok(())
    }

    /// Drive a prompt to completion.
    ///
    /// The subscription to the Completed signal is established before
    /// the Prompt trigger call goes out; in the other order the signal
    /// can fire before anyone is listening and the wait never ends.
    /// The wait itself is bounded by the configured prompt timeout.
    async fn await_prompt(&self, prompt: &OwnedObjectPath) -> Result<OwnedValue> {
        let rule = MatchRule::builder()
            .msg_type(message::Type::Signal)
            .interface(proto::PROMPT_IFACE)?
            .member(proto::COMPLETED)?
            .path(prompt.as_str())?
            .build();
        let mut completions =
            MessageStream::for_match_rule(rule, &self.connection, Some(4)).await?;
        self.call(prompt.as_str(), proto::PROMPT_IFACE, proto::PROMPT, &"")
            .await?;
        let signal = tokio::time::timeout(self.prompt_timeout, completions.next())
            .await
            .map_err(|_| Error::PromptTimeout(self.prompt_timeout))?
            .ok_or_else(|| {
                Error::Transport(zbus::Error::Failure(
                    "connection closed while waiting for prompt completion".to_string(),
                ))
            })??;
        let (dismissed, result): (bool, OwnedValue) = signal.body().deserialize()?;
        debug!(prompt = %prompt, dismissed, "prompt completed");
        if dismissed {
            return Err(Error::Dismissed);
        }
        Ok(result)
    }

    /// One round trip against the service.
    ///
    /// On a message bus the well-known service name is the
    /// destination; on a peer-to-peer connection there is no name to
    /// address and the field is left empty.
    async fn call<B>(&self, path: &str, interface: &str, method: &str, body: &B) -> Result<Message>
    where
        B: Serialize + DynamicType,
    {
        let destination = if self.connection.is_bus() {
            Some(proto::BUS_NAME)
        } else {
            None
        };
        let reply = self
            .connection
            .call_method(destination, path, Some(interface), method, body)
            .await?;
        Ok(reply)
    }
}
