//! # Lifecycle Flows
//!
//! Multi-step flows beyond the basic scenarios: trust handover, backfill,
//! pruning, independent clients, the message surface and configuration.

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use ics02_client::{
        ClientConfig, ClientError, ClientEvent, ClientKind, ClientManagerApi, ClientMsg,
        ClientResponse, ClientStatus, ErrorCategory, MisbehaviourOutcome, RetentionPolicy,
        UpdateOutcome,
    };

    use crate::fixtures::{
        client_id, manager_with, new_manager, root, SoloMachine, TendermintChain,
        GENESIS_HOST_HEIGHT,
    };

    #[test]
    fn test_validator_set_handover() -> Result<()> {
        let old = TendermintChain::new(1, 4);
        let new = TendermintChain::new(100, 3);
        let mut manager = new_manager();
        let id = client_id("chain-A");
        manager.create_client(id.clone(), ClientKind::Tendermint, old.consensus_state(1, root(1)))?;

        manager.update_client(&id, old.handover(&new, 2, root(2)))?;
        assert_eq!(
            manager.consensus_state(&id, 2)?,
            new.consensus_state(2, root(2))
        );

        // Only the new set is trusted from here on.
        assert!(manager.update_client(&id, old.header(3, root(3))).is_err());
        manager.update_client(&id, new.header(3, root(3)))?;
        assert_eq!(manager.client_state(&id)?.latest_height(), 3);
        Ok(())
    }

    #[test]
    fn test_solo_machine_key_rotation() -> Result<()> {
        let first = SoloMachine::new(7);
        let second = SoloMachine::new(8);
        let mut manager = new_manager();
        let id = client_id("solo-0");
        manager.create_client(id.clone(), ClientKind::SoloMachine, first.consensus_state(1, root(1)))?;

        manager.update_client(&id, first.rotate_to(&second, 2, root(2)))?;
        assert!(matches!(
            manager.update_client(&id, first.header(3, root(3))),
            Err(ClientError::Validation(_))
        ));
        assert_eq!(
            manager.update_client(&id, second.header(3, root(3)))?,
            UpdateOutcome::Advanced { height: 3 }
        );
        Ok(())
    }

    #[test]
    fn test_backfill_fills_gaps_and_detects_conflicts() -> Result<()> {
        let chain = TendermintChain::new(1, 4).with_backfill();
        let mut manager = new_manager();
        let id = client_id("chain-B");
        manager.create_client(id.clone(), ClientKind::Tendermint, chain.consensus_state(10, root(10)))?;
        manager.update_client(&id, chain.header(20, root(20)))?;

        assert_eq!(
            manager.update_client(&id, chain.header(15, root(15)))?,
            UpdateOutcome::Backfilled { height: 15 }
        );
        assert_eq!(manager.client_state(&id)?.latest_height(), 20);
        manager.verify_root(&id, 15, &root(15))?;

        assert_eq!(
            manager.update_client(&id, chain.header(15, root(15)))?,
            UpdateOutcome::AlreadyVerified { height: 15 }
        );
        assert!(matches!(
            manager.update_client(&id, chain.header(20, root(20))),
            Err(ClientError::Validation(_))
        ));

        assert_eq!(
            manager.update_client(&id, chain.header(15, root(0xff)))?,
            UpdateOutcome::MisbehaviourDetected { height: 15 }
        );
        assert_eq!(manager.client_status(&id)?, ClientStatus::Frozen);
        manager.verify_root(&id, 15, &root(15))?;
        Ok(())
    }

    #[test]
    fn test_strict_client_never_backfills() -> Result<()> {
        let chain = TendermintChain::new(1, 4);
        let mut manager = new_manager();
        let id = client_id("chain-A");
        manager.create_client(id.clone(), ClientKind::Tendermint, chain.consensus_state(10, root(10)))?;
        manager.update_client(&id, chain.header(20, root(20)))?;

        let err = manager
            .update_client(&id, chain.header(15, root(15)))
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Validation);
        Ok(())
    }

    #[test]
    fn test_retention_keeps_latest_roots() -> Result<()> {
        let chain = TendermintChain::new(1, 4);
        let mut manager = manager_with(ClientConfig {
            allowed_kinds: ClientKind::ALL.to_vec(),
            retention: RetentionPolicy {
                max_roots: Some(4),
                max_age: None,
            },
        });
        let id = client_id("chain-A");
        manager.create_client(id.clone(), ClientKind::Tendermint, chain.consensus_state(1, root(1)))?;
        for height in 2..=10 {
            manager.update_client(&id, chain.header(height, root(height as u8)))?;
        }

        let client = manager.client_state(&id)?;
        assert_eq!(client.verified_heights().collect::<Vec<_>>(), vec![7, 8, 9, 10]);
        for pruned in 1..=6 {
            assert!(matches!(
                manager.verify_root(&id, pruned, &root(pruned as u8)),
                Err(ClientError::RootNotFound { .. })
            ));
        }
        for kept in 7..=10 {
            manager.verify_root(&id, kept, &root(kept as u8))?;
        }
        Ok(())
    }

    #[test]
    fn test_retention_by_host_age() -> Result<()> {
        let chain = TendermintChain::new(1, 4);
        let mut manager = manager_with(ClientConfig {
            allowed_kinds: ClientKind::ALL.to_vec(),
            retention: RetentionPolicy {
                max_roots: None,
                max_age: Some(50),
            },
        });
        let id = client_id("chain-A");
        manager.create_client(id.clone(), ClientKind::Tendermint, chain.consensus_state(1, root(1)))?;

        manager.host_mut().set(GENESIS_HOST_HEIGHT + 40);
        manager.update_client(&id, chain.header(2, root(2)))?;
        manager.host_mut().set(GENESIS_HOST_HEIGHT + 60);
        manager.update_client(&id, chain.header(3, root(3)))?;

        let client = manager.client_state(&id)?;
        assert_eq!(client.verified_heights().collect::<Vec<_>>(), vec![2, 3]);

        let pruned: Vec<_> = manager
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                ClientEvent::RootsPruned { heights, .. } => Some(heights),
                _ => None,
            })
            .collect();
        assert_eq!(pruned, vec![vec![1]]);
        Ok(())
    }

    #[test]
    fn test_clients_are_independent() -> Result<()> {
        let chain_a = TendermintChain::new(1, 4);
        let solo = SoloMachine::new(9);
        let mut manager = new_manager();
        let (a, b) = (client_id("chain-A"), client_id("solo-B"));
        manager.create_client(a.clone(), ClientKind::Tendermint, chain_a.consensus_state(1, root(1)))?;
        manager.create_client(b.clone(), ClientKind::SoloMachine, solo.consensus_state(1, root(1)))?;

        manager.submit_misbehaviour(&b, &solo.header(1, root(2)), &solo.header(1, root(3)))?;

        assert_eq!(manager.client_status(&a)?, ClientStatus::Active);
        assert_eq!(manager.client_status(&b)?, ClientStatus::Frozen);
        manager.update_client(&a, chain_a.header(2, root(2)))?;
        assert_eq!(manager.client_ids()?, vec![a, b]);
        Ok(())
    }

    #[test]
    fn test_cross_kind_header_rejected() -> Result<()> {
        let chain = TendermintChain::new(1, 4);
        let solo = SoloMachine::new(1);
        let mut manager = new_manager();
        let id = client_id("chain-A");
        manager.create_client(id.clone(), ClientKind::Tendermint, chain.consensus_state(1, root(1)))?;

        assert!(manager.update_client(&id, solo.header(2, root(2))).is_err());
        assert_eq!(manager.client_state(&id)?.latest_height(), 1);
        Ok(())
    }

    #[test]
    fn test_dispatch_round_trip() -> Result<()> {
        let chain = TendermintChain::new(1, 4);
        let mut manager = new_manager();
        let id = client_id("chain-A");

        let responses = [
            ClientMsg::CreateClient {
                client_id: id.clone(),
                kind: ClientKind::Tendermint,
                consensus_state: chain.consensus_state(1, root(1)),
            },
            ClientMsg::UpdateClient {
                client_id: id.clone(),
                header: chain.header(2, root(2)),
            },
            ClientMsg::VerifyRoot {
                client_id: id.clone(),
                height: 2,
                expected_root: root(2),
            },
            ClientMsg::SubmitMisbehaviour {
                client_id: id.clone(),
                header_a: chain.header(2, root(2)),
                header_b: chain.header(2, root(9)),
            },
        ]
        .into_iter()
        .map(|msg| manager.dispatch(msg))
        .collect::<Result<Vec<_>, _>>()?;

        assert_eq!(
            responses,
            vec![
                ClientResponse::Created { height: 1 },
                ClientResponse::Updated(UpdateOutcome::Advanced { height: 2 }),
                ClientResponse::RootVerified,
                ClientResponse::Misbehaviour(MisbehaviourOutcome::Frozen),
            ]
        );

        let err = manager
            .dispatch(ClientMsg::UpdateClient {
                client_id: id.clone(),
                header: chain.header(3, root(3)),
            })
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Lifecycle);
        Ok(())
    }

    #[test]
    fn test_config_from_env() {
        std::env::set_var("ICS02_ALLOWED_KINDS", "06-solomachine");
        std::env::set_var("ICS02_MAX_ROOTS", "16");
        std::env::set_var("ICS02_MAX_ROOT_AGE", "none");

        let config = ClientConfig::from_env();

        std::env::remove_var("ICS02_ALLOWED_KINDS");
        std::env::remove_var("ICS02_MAX_ROOTS");
        std::env::remove_var("ICS02_MAX_ROOT_AGE");

        assert_eq!(config.allowed_kinds, vec![ClientKind::SoloMachine]);
        assert_eq!(config.retention.max_roots, Some(16));
        assert_eq!(config.retention.max_age, None);

        let chain = TendermintChain::new(1, 4);
        let mut manager = manager_with(config);
        assert_eq!(
            manager.create_client(
                client_id("chain-A"),
                ClientKind::Tendermint,
                chain.consensus_state(1, root(1)),
            ),
            Err(ClientError::UnsupportedKind(ClientKind::Tendermint))
        );
    }
}
