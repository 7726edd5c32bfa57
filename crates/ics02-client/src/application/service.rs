//! # Client Manager
//!
//! Application service owning the client lifecycle: creation, header
//! updates, misbehaviour handling, root queries and pruning.
//!
//! Every mutating operation loads the client from the store, computes the
//! complete result in memory and persists it with one atomic batch write.
//! A failure at any step leaves the store untouched.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::adapters::{keys, BincodeRecordCodec, ClientRecord};
use crate::algorithms::{select_evictions, PredicateRegistry};
use crate::config::ClientConfig;
use crate::domain::{
    invariant_latest_root_recorded, invariant_no_root_overwrite, invariant_non_empty_root,
    ClientError, ClientEvent, ClientId, ClientKind, ClientState, CommitmentRoot, ConsensusState,
    Header, Height, KVStoreError, ValidationError, VerifiedRoot,
};
use crate::ports::{
    BatchOperation, ClientManagerApi, ClientMsg, ClientResponse, ClientStatus, HostHeightSource,
    KeyValueStore, MisbehaviourOutcome, UpdateOutcome,
};

/// Client Manager - sole mutator of client state.
pub struct ClientManager<S: KeyValueStore, H: HostHeightSource> {
    /// Configuration.
    config: ClientConfig,
    /// Persisted client records.
    store: S,
    /// Current host height.
    host: H,
    /// Kind → predicate dispatch.
    registry: Arc<PredicateRegistry>,
    /// Record codec.
    codec: BincodeRecordCodec,
    /// Events not yet drained by the host.
    events: Vec<ClientEvent>,
}

impl<S: KeyValueStore, H: HostHeightSource> ClientManager<S, H> {
    /// Create a manager using the process-wide predicate registry.
    pub fn new(config: ClientConfig, store: S, host: H) -> Self {
        Self::with_registry(config, store, host, PredicateRegistry::global())
    }

    /// Create a manager with an explicit predicate registry.
    pub fn with_registry(
        config: ClientConfig,
        store: S,
        host: H,
        registry: Arc<PredicateRegistry>,
    ) -> Self {
        Self {
            config,
            store,
            host,
            registry,
            codec: BincodeRecordCodec,
            events: Vec::new(),
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Underlying store, mutably. Bypasses every client invariant.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Release the store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Host height source, mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Predicate registry in use.
    pub fn registry(&self) -> &PredicateRegistry {
        &self.registry
    }

    /// Take every event recorded since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<ClientEvent> {
        std::mem::take(&mut self.events)
    }

    /// Route a typed message to its operation.
    pub fn dispatch(&mut self, msg: ClientMsg) -> Result<ClientResponse, ClientError> {
        match msg {
            ClientMsg::CreateClient {
                client_id,
                kind,
                consensus_state,
            } => self
                .create_client(client_id, kind, consensus_state)
                .map(|height| ClientResponse::Created { height }),
            ClientMsg::UpdateClient { client_id, header } => self
                .update_client(&client_id, header)
                .map(ClientResponse::Updated),
            ClientMsg::SubmitMisbehaviour {
                client_id,
                header_a,
                header_b,
            } => self
                .submit_misbehaviour(&client_id, &header_a, &header_b)
                .map(ClientResponse::Misbehaviour),
            ClientMsg::VerifyRoot {
                client_id,
                height,
                expected_root,
            } => self
                .verify_root(&client_id, height, &expected_root)
                .map(|()| ClientResponse::RootVerified),
        }
    }

    // =========================================================================
    // Loading
    // =========================================================================

    fn load_record(&self, client_id: &ClientId) -> Result<ClientRecord, ClientError> {
        let bytes = self
            .store
            .get(&keys::client_state(client_id))?
            .ok_or_else(|| ClientError::ClientNotFound(client_id.clone()))?;
        Ok(self.codec.decode(&bytes)?)
    }

    fn load_client(&self, client_id: &ClientId) -> Result<ClientState, ClientError> {
        let record = self.load_record(client_id)?;

        let latest: ConsensusState = self
            .store
            .get(&keys::consensus_state(client_id, record.latest_height))?
            .map(|bytes| self.codec.decode(&bytes))
            .transpose()?
            .ok_or_else(|| {
                corruption(format!(
                    "client {} has no consensus state at latest height {}",
                    client_id, record.latest_height
                ))
            })?;
        if latest.kind() != record.kind {
            return Err(corruption(format!(
                "client {} record kind {} differs from consensus state kind {}",
                client_id,
                record.kind,
                latest.kind()
            )));
        }

        let mut verified_roots = BTreeMap::new();
        for (key, bytes) in self.store.prefix_scan(&keys::root_prefix(client_id))? {
            let height = keys::height_suffix(&key).ok_or_else(|| {
                corruption(format!("malformed root key for client {}", client_id))
            })?;
            let entry: VerifiedRoot = self.codec.decode(&bytes)?;
            verified_roots.insert(height, entry);
        }
        if !invariant_latest_root_recorded(&verified_roots, record.latest_height) {
            return Err(corruption(format!(
                "client {} has no root at latest height {}",
                client_id, record.latest_height
            )));
        }

        Ok(ClientState::from_parts(
            client_id.clone(),
            latest,
            verified_roots,
            record.frozen,
        ))
    }

    fn load_root(&self, client_id: &ClientId, height: Height) -> Result<VerifiedRoot, ClientError> {
        self.load_record(client_id)?;
        let bytes = self
            .store
            .get(&keys::root(client_id, height))?
            .ok_or_else(|| ClientError::RootNotFound {
                client_id: client_id.clone(),
                height,
            })?;
        Ok(self.codec.decode(&bytes)?)
    }

    // =========================================================================
    // Writing
    // =========================================================================

    fn put<T: Serialize>(
        &self,
        batch: &mut Vec<BatchOperation>,
        key: Vec<u8>,
        value: &T,
    ) -> Result<(), ClientError> {
        batch.push(BatchOperation::put(key, self.codec.encode(value)?));
        Ok(())
    }

    fn put_record(
        &self,
        batch: &mut Vec<BatchOperation>,
        client: &ClientState,
    ) -> Result<(), ClientError> {
        let record = ClientRecord {
            kind: client.kind(),
            frozen: client.is_frozen(),
            latest_height: client.latest_height(),
        };
        self.put(batch, keys::client_state(client.client_id()), &record)
    }

    fn put_height(
        &self,
        batch: &mut Vec<BatchOperation>,
        client: &ClientState,
        consensus_state: &ConsensusState,
    ) -> Result<(), ClientError> {
        let client_id = client.client_id();
        let height = consensus_state.height();
        let entry = client.verified_root(height).ok_or_else(|| {
            corruption(format!("client {} lost root at height {}", client_id, height))
        })?;
        self.put(batch, keys::consensus_state(client_id, height), consensus_state)?;
        self.put(batch, keys::root(client_id, height), entry)
    }

    /// Apply the retention policy, queueing deletes for evicted heights.
    ///
    /// The latest height and `recorded`, the height this update verified,
    /// are kept.
    fn prune(
        &self,
        batch: &mut Vec<BatchOperation>,
        client: &mut ClientState,
        recorded: Height,
    ) -> Option<ClientEvent> {
        let evictions = select_evictions(
            client.verified_roots(),
            &[client.latest_height(), recorded],
            &self.config.retention,
            self.host.current(),
        );
        let removed = client.remove_roots(&evictions);
        if removed.is_empty() {
            return None;
        }

        for height in &removed {
            batch.push(BatchOperation::delete(keys::root(client.client_id(), *height)));
            batch.push(BatchOperation::delete(keys::consensus_state(
                client.client_id(),
                *height,
            )));
        }
        debug!(
            "[ics02] Pruning {} root(s) of client {}",
            removed.len(),
            client.client_id()
        );
        Some(ClientEvent::RootsPruned {
            client_id: client.client_id().clone(),
            heights: removed,
        })
    }

    fn commit(
        &mut self,
        batch: Vec<BatchOperation>,
        events: Vec<ClientEvent>,
    ) -> Result<(), ClientError> {
        self.store.atomic_batch_write(batch)?;
        self.events.extend(events);
        Ok(())
    }

    fn freeze(&mut self, mut client: ClientState, height: Height) -> Result<(), ClientError> {
        client.freeze();
        let mut batch = Vec::new();
        self.put_record(&mut batch, &client)?;
        let event = ClientEvent::ClientFrozen {
            client_id: client.client_id().clone(),
            height,
        };
        self.commit(batch, vec![event])?;
        warn!(
            "[ics02] Client {} frozen: conflicting headers at height {}",
            client.client_id(),
            height
        );
        Ok(())
    }
}

impl<S: KeyValueStore, H: HostHeightSource> ClientManagerApi for ClientManager<S, H> {
    fn create_client(
        &mut self,
        client_id: ClientId,
        kind: ClientKind,
        consensus_state: ConsensusState,
    ) -> Result<Height, ClientError> {
        if self.store.exists(&keys::client_state(&client_id))? {
            return Err(ClientError::DuplicateClient(client_id));
        }
        if !self.config.allows(kind) || !self.registry.supports(kind) {
            return Err(ClientError::UnsupportedKind(kind));
        }
        if consensus_state.kind() != kind {
            return Err(ValidationError::InconsistentState(format!(
                "declared kind {} differs from consensus state kind {}",
                kind,
                consensus_state.kind()
            ))
            .into());
        }
        invariant_non_empty_root(consensus_state.root())?;
        self.registry
            .get(kind)?
            .check_new_state(&consensus_state, &consensus_state)?;

        let height = consensus_state.height();
        let client = ClientState::create(client_id, consensus_state, self.host.current());

        let mut batch = Vec::new();
        self.put_record(&mut batch, &client)?;
        self.put_height(&mut batch, &client, client.latest_consensus_state())?;
        let event = ClientEvent::ClientCreated {
            client_id: client.client_id().clone(),
            kind,
            height,
        };
        self.commit(batch, vec![event])?;

        info!(
            "[ics02] Created {} client {} at height {}",
            kind,
            client.client_id(),
            height
        );
        Ok(height)
    }

    fn update_client(
        &mut self,
        client_id: &ClientId,
        header: Header,
    ) -> Result<UpdateOutcome, ClientError> {
        let mut client = self.load_client(client_id)?;
        if client.is_frozen() {
            return Err(ClientError::ClientFrozen(client_id.clone()));
        }

        let next = self
            .registry
            .validate(client.latest_consensus_state(), &header)
            .map_err(|e| {
                debug!("[ics02] Rejected header for client {}: {}", client_id, e);
                e
            })?;
        let height = next.height();
        let host_height = self.host.current();

        let outcome = if height > client.latest_height() {
            client.advance(next.clone(), host_height);
            UpdateOutcome::Advanced { height }
        } else if !invariant_no_root_overwrite(client.verified_roots(), height, next.root()) {
            // Authentic header contradicting a verified root.
            self.freeze(client, height)?;
            return Ok(UpdateOutcome::MisbehaviourDetected { height });
        } else if client.verified_root(height).is_some() {
            debug!(
                "[ics02] Client {} already verified height {}",
                client_id, height
            );
            return Ok(UpdateOutcome::AlreadyVerified { height });
        } else {
            client.record_backfill(height, next.root().clone(), host_height);
            UpdateOutcome::Backfilled { height }
        };

        let mut batch = Vec::new();
        self.put_height(&mut batch, &client, &next)?;
        self.put_record(&mut batch, &client)?;
        let mut events = vec![ClientEvent::ClientUpdated {
            client_id: client_id.clone(),
            height,
            latest_height: client.latest_height(),
        }];
        events.extend(self.prune(&mut batch, &mut client, height));
        self.commit(batch, events)?;

        info!(
            "[ics02] Client {} verified height {} (latest {})",
            client_id,
            height,
            client.latest_height()
        );
        Ok(outcome)
    }

    fn submit_misbehaviour(
        &mut self,
        client_id: &ClientId,
        header_a: &Header,
        header_b: &Header,
    ) -> Result<MisbehaviourOutcome, ClientError> {
        let client = self.load_client(client_id)?;
        let equivocation =
            self.registry
                .is_equivocation(client.latest_consensus_state(), header_a, header_b);

        if client.is_frozen() {
            if equivocation {
                debug!("[ics02] Client {} already frozen", client_id);
                return Ok(MisbehaviourOutcome::AlreadyFrozen);
            }
            return Err(ClientError::ClientFrozen(client_id.clone()));
        }
        if !equivocation {
            warn!(
                "[ics02] Rejected misbehaviour evidence for client {}",
                client_id
            );
            return Err(ClientError::NoMisbehaviour(client_id.clone()));
        }

        self.freeze(client, header_a.height)?;
        Ok(MisbehaviourOutcome::Frozen)
    }

    fn verify_root(
        &self,
        client_id: &ClientId,
        height: Height,
        expected_root: &CommitmentRoot,
    ) -> Result<(), ClientError> {
        let entry = self.load_root(client_id, height)?;
        if &entry.root != expected_root {
            return Err(ClientError::RootMismatch {
                client_id: client_id.clone(),
                height,
                expected: expected_root.clone(),
                recorded: entry.root,
            });
        }
        Ok(())
    }

    fn client_state(&self, client_id: &ClientId) -> Result<ClientState, ClientError> {
        self.load_client(client_id)
    }

    fn consensus_state(
        &self,
        client_id: &ClientId,
        height: Height,
    ) -> Result<ConsensusState, ClientError> {
        self.load_record(client_id)?;
        let bytes = self
            .store
            .get(&keys::consensus_state(client_id, height))?
            .ok_or_else(|| ClientError::RootNotFound {
                client_id: client_id.clone(),
                height,
            })?;
        Ok(self.codec.decode(&bytes)?)
    }

    fn root_at(&self, client_id: &ClientId, height: Height) -> Result<CommitmentRoot, ClientError> {
        Ok(self.load_root(client_id, height)?.root)
    }

    fn client_status(&self, client_id: &ClientId) -> Result<ClientStatus, ClientError> {
        Ok(if self.load_record(client_id)?.frozen {
            ClientStatus::Frozen
        } else {
            ClientStatus::Active
        })
    }

    fn client_ids(&self) -> Result<Vec<ClientId>, ClientError> {
        self.store
            .prefix_scan(keys::CLIENT_STATE_PREFIX.as_bytes())?
            .into_iter()
            .map(|(key, _)| {
                keys::client_id_suffix(&key)
                    .ok_or_else(|| corruption("malformed client state key".to_string()))
            })
            .collect()
    }
}

fn corruption(message: String) -> ClientError {
    KVStoreError::CorruptionError { message }.into()
}
