//! # Client Properties
//!
//! Randomized checks of the guarantees every client must keep regardless
//! of the header sequence it is fed.

#[cfg(test)]
mod tests {
    use ics02_client::{
        ClientKind, ClientManagerApi, ClientStatus, PredicateRegistry, UpdateOutcome,
    };
    use proptest::prelude::*;

    use crate::fixtures::{client_id, new_manager, root, TendermintChain, TestManager};

    fn chain() -> TendermintChain {
        TendermintChain::new(1, 4)
    }

    fn manager_at(chain: &TendermintChain, height: u64) -> TestManager {
        let mut manager = new_manager();
        manager
            .create_client(
                client_id("chain-A"),
                ClientKind::Tendermint,
                chain.consensus_state(1, root(1)),
            )
            .unwrap();
        for h in 2..=height {
            manager
                .update_client(&client_id("chain-A"), chain.header(h, root(h as u8)))
                .unwrap();
        }
        manager
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn equivocation_is_symmetric(
            (h_a, h_b) in (1u64..4, 1u64..4),
            (r_a, r_b) in (0u8..3, 0u8..3),
            (m_a, m_b) in (0u32..16, 0u32..16),
        ) {
            let chain = chain();
            let cs = chain.consensus_state(1, root(0xff));
            let a = chain.header_signed_by_mask(h_a, root(r_a), m_a);
            let b = chain.header_signed_by_mask(h_b, root(r_b), m_b);
            let registry = PredicateRegistry::global();

            prop_assert_eq!(
                registry.is_equivocation(&cs, &a, &b),
                registry.is_equivocation(&cs, &b, &a)
            );
        }

        #[test]
        fn failed_update_changes_nothing(
            height in 0u64..8,
            root_byte in any::<u8>(),
            mask in 0u32..16,
        ) {
            let chain = chain();
            let mut manager = manager_at(&chain, 4);
            let id = client_id("chain-A");
            let digest = manager.client_state(&id).unwrap().state_digest();
            let snapshot = manager.store().snapshot();

            let header = chain.header_signed_by_mask(height, root(root_byte), mask);
            match manager.update_client(&id, header) {
                Ok(outcome) => {
                    prop_assert_eq!(outcome, UpdateOutcome::Advanced { height });
                    prop_assert!(height > 4 && mask_accepts(mask));
                    prop_assert_eq!(manager.client_state(&id).unwrap().latest_height(), height);
                }
                Err(_) => {
                    prop_assert_eq!(manager.client_state(&id).unwrap().state_digest(), digest);
                    prop_assert_eq!(manager.store().snapshot(), snapshot);
                }
            }
        }

        #[test]
        fn freeze_is_monotonic(
            ops in prop::collection::vec((1u64..10, any::<u8>(), any::<bool>()), 1..12),
        ) {
            let chain = chain();
            let mut manager = manager_at(&chain, 3);
            let id = client_id("chain-A");
            manager
                .submit_misbehaviour(&id, &chain.header(3, root(3)), &chain.header(3, root(0xee)))
                .unwrap();

            for (height, root_byte, as_evidence) in ops {
                if as_evidence {
                    let _ = manager.submit_misbehaviour(
                        &id,
                        &chain.header(height, root(root_byte)),
                        &chain.header(height, root(root_byte.wrapping_add(1))),
                    );
                } else {
                    let _ = manager.update_client(&id, chain.header(height, root(root_byte)));
                }
                prop_assert_eq!(manager.client_status(&id).unwrap(), ClientStatus::Frozen);
            }
        }

        #[test]
        fn repeated_evidence_is_idempotent(repeats in 1usize..5, swap in any::<bool>()) {
            let chain = chain();
            let mut once = manager_at(&chain, 2);
            let mut many = manager_at(&chain, 2);
            let id = client_id("chain-A");
            let a = chain.header(2, root(0x10));
            let b = chain.header(2, root(0x20));

            once.submit_misbehaviour(&id, &a, &b).unwrap();
            for i in 0..repeats {
                let (x, y) = if swap && i % 2 == 1 { (&b, &a) } else { (&a, &b) };
                many.submit_misbehaviour(&id, x, y).unwrap();
            }

            prop_assert_eq!(once.store().snapshot(), many.store().snapshot());
        }

        #[test]
        fn verified_roots_persist(
            steps in prop::collection::vec((1u64..4, any::<u8>(), 0u32..16), 1..10),
        ) {
            let chain = chain();
            let mut manager = manager_at(&chain, 1);
            let id = client_id("chain-A");
            let mut recorded = vec![(1u64, root(1))];
            let mut height = 1u64;

            for (step, root_byte, mask) in steps {
                let header = chain.header_signed_by_mask(height + step, root(root_byte), mask);
                let accepted = manager.update_client(&id, header).is_ok();
                prop_assert_eq!(accepted, mask_accepts(mask));
                if accepted {
                    height += step;
                    recorded.push((height, root(root_byte)));
                }
                for (h, r) in &recorded {
                    prop_assert!(manager.verify_root(&id, *h, r).is_ok());
                }
            }
        }
    }

    /// Whether a commit from the validators in `mask` reaches quorum.
    fn mask_accepts(mask: u32) -> bool {
        (mask & 0b1111).count_ones() * 3 > 4 * 2
    }
}
