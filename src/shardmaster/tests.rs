#[cfg(test)]
mod tests {
    use crate::error::StoreError;
    use crate::shard::interval::{Shard, MAX_KEY, MIN_KEY};
    use crate::shardmaster::protocol::ConfigEntry;
    use crate::shardmaster::service::ShardMaster;

    /// Coverage invariant: across all servers the intervals tile the whole
    /// key space with no gap and no overlap.
    fn assert_partitions_keyspace(config: &[ConfigEntry]) {
        let mut shards: Vec<Shard> = config
            .iter()
            .flat_map(|entry| entry.shards.iter().copied())
            .collect();
        shards.sort_by_key(|s| s.lower);
        assert!(!shards.is_empty());
        assert_eq!(shards[0].lower, MIN_KEY);
        for pair in shards.windows(2) {
            assert_eq!(
                pair[0].upper + 1,
                pair[1].lower,
                "gap or overlap between {:?} and {:?}",
                pair[0],
                pair[1]
            );
        }
        assert_eq!(shards.last().unwrap().upper, MAX_KEY);
    }

    // ============================================================
    // JOIN
    // ============================================================

    #[tokio::test]
    async fn join_rejects_empty_server() {
        let master = ShardMaster::new();
        assert_eq!(master.join("").await, Err(StoreError::EmptyServer));
    }

    #[tokio::test]
    async fn join_rejects_duplicate_server() {
        let master = ShardMaster::new();
        master.join("a").await.unwrap();
        assert_eq!(
            master.join("a").await,
            Err(StoreError::DuplicateServer("a".to_string()))
        );
    }

    #[tokio::test]
    async fn first_join_owns_the_whole_keyspace() {
        let master = ShardMaster::new();
        master.join("a").await.unwrap();
        let config = master.query().await;
        assert_eq!(config.len(), 1);
        assert_eq!(config[0].server, "a");
        assert_eq!(config[0].shards, vec![Shard::new(MIN_KEY, MAX_KEY)]);
    }

    #[tokio::test]
    async fn joins_repartition_deterministically() {
        let master = ShardMaster::new();
        master.join("a").await.unwrap();
        master.join("b").await.unwrap();
        master.join("c").await.unwrap();

        let config = master.query().await;
        let servers: Vec<&str> = config.iter().map(|e| e.server.as_str()).collect();
        assert_eq!(servers, vec!["a", "b", "c"]);
        assert_eq!(config[0].shards, vec![Shard::new(0, 333)]);
        assert_eq!(config[1].shards, vec![Shard::new(334, 666)]);
        assert_eq!(config[2].shards, vec![Shard::new(667, 999)]);
        assert_partitions_keyspace(&config);
    }

    #[tokio::test]
    async fn join_and_leave_always_yield_one_interval_per_server() {
        let master = ShardMaster::new();
        for server in ["a", "b", "c", "d", "e"] {
            master.join(server).await.unwrap();
            let config = master.query().await;
            assert_partitions_keyspace(&config);
            for entry in &config {
                assert_eq!(entry.shards.len(), 1, "{} owns several", entry.server);
            }
        }
        master.leave(&["b".to_string(), "d".to_string()]).await.unwrap();
        let config = master.query().await;
        assert_partitions_keyspace(&config);
        for entry in &config {
            assert_eq!(entry.shards.len(), 1);
        }
    }

    // ============================================================
    // LEAVE
    // ============================================================

    #[tokio::test]
    async fn leave_rejects_empty_list() {
        let master = ShardMaster::new();
        assert_eq!(master.leave(&[]).await, Err(StoreError::EmptyServerList));
    }

    #[tokio::test]
    async fn leave_rejects_unknown_server_without_mutating() {
        let master = ShardMaster::new();
        master.join("a").await.unwrap();
        let before = master.query().await;

        let result = master
            .leave(&["a".to_string(), "ghost".to_string()])
            .await;
        assert_eq!(result, Err(StoreError::UnknownServer("ghost".to_string())));

        let after = master.query().await;
        assert_eq!(after.len(), before.len());
        assert_eq!(after[0].server, "a");
        assert_eq!(after[0].shards, vec![Shard::new(MIN_KEY, MAX_KEY)]);
    }

    #[tokio::test]
    async fn leave_rejects_duplicate_departure() {
        let master = ShardMaster::new();
        master.join("a").await.unwrap();
        master.join("b").await.unwrap();
        let result = master.leave(&["b".to_string(), "b".to_string()]).await;
        assert_eq!(result, Err(StoreError::UnknownServer("b".to_string())));
    }

    #[tokio::test]
    async fn leave_rebalances_survivors_in_join_order() {
        let master = ShardMaster::new();
        master.join("a").await.unwrap();
        master.join("b").await.unwrap();
        master.join("c").await.unwrap();
        master.leave(&["b".to_string()]).await.unwrap();

        let config = master.query().await;
        let servers: Vec<&str> = config.iter().map(|e| e.server.as_str()).collect();
        assert_eq!(servers, vec!["a", "c"]);
        assert_eq!(config[0].shards, vec![Shard::new(0, 499)]);
        assert_eq!(config[1].shards, vec![Shard::new(500, 999)]);
    }

    #[tokio::test]
    async fn leaving_everyone_empties_the_configuration() {
        let master = ShardMaster::new();
        master.join("a").await.unwrap();
        master.join("b").await.unwrap();
        master
            .leave(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert!(master.query().await.is_empty());
    }

    #[tokio::test]
    async fn join_then_leave_restores_the_previous_configuration() {
        let master = ShardMaster::new();
        master.join("a").await.unwrap();
        master.join("b").await.unwrap();
        let before = master.query().await;

        master.join("c").await.unwrap();
        master.leave(&["c".to_string()]).await.unwrap();

        let after = master.query().await;
        assert_eq!(after.len(), before.len());
        for (b, a) in before.iter().zip(after.iter()) {
            assert_eq!(b.server, a.server);
            assert_eq!(b.shards, a.shards);
        }
    }

    // ============================================================
    // MOVE
    // ============================================================

    #[tokio::test]
    async fn move_rejects_bad_requests() {
        let master = ShardMaster::new();
        master.join("a").await.unwrap();
        assert_eq!(
            master.move_shard("", Shard::new(0, 10)).await,
            Err(StoreError::EmptyServer)
        );
        assert_eq!(
            master.move_shard("ghost", Shard::new(0, 10)).await,
            Err(StoreError::UnknownServer("ghost".to_string()))
        );
        assert_eq!(
            master.move_shard("a", Shard::new(10, 0)).await,
            Err(StoreError::InvalidShard(10, 0))
        );
    }

    #[tokio::test]
    async fn move_carves_an_interior_interval() {
        let master = ShardMaster::new();
        master.join("a").await.unwrap();
        master.move_shard("a", Shard::new(200, 300)).await.unwrap();

        let config = master.query().await;
        assert_eq!(
            config[0].shards,
            vec![
                Shard::new(0, 199),
                Shard::new(301, 999),
                Shard::new(200, 300),
            ]
        );
        assert_partitions_keyspace(&config);
    }

    #[tokio::test]
    async fn move_fragments_the_previous_owner() {
        let master = ShardMaster::new();
        master.join("a").await.unwrap();
        master.join("b").await.unwrap();
        master.move_shard("b", Shard::new(200, 300)).await.unwrap();

        let config = master.query().await;
        assert_eq!(config[0].server, "a");
        assert_eq!(
            config[0].shards,
            vec![Shard::new(0, 199), Shard::new(301, 499)]
        );
        assert_eq!(config[1].server, "b");
        assert_eq!(
            config[1].shards,
            vec![Shard::new(500, 999), Shard::new(200, 300)]
        );
        assert_partitions_keyspace(&config);
    }

    #[tokio::test]
    async fn move_swallows_intervals_sharing_a_bound() {
        let master = ShardMaster::new();
        master.join("a").await.unwrap();
        master.join("b").await.unwrap();
        // Covers a's [0, 499] entirely, bound-aligned at zero, and the lower
        // part of b's [500, 999].
        master.move_shard("b", Shard::new(0, 600)).await.unwrap();

        let config = master.query().await;
        assert_eq!(config[0].server, "a");
        assert!(config[0].shards.is_empty());
        assert_eq!(config[1].server, "b");
        assert_eq!(
            config[1].shards,
            vec![Shard::new(601, 999), Shard::new(0, 600)]
        );
        assert_partitions_keyspace(&config);
    }

    #[tokio::test]
    async fn moves_keep_redistributing_without_losing_coverage() {
        let master = ShardMaster::new();
        master.join("a").await.unwrap();
        master.join("b").await.unwrap();
        master.join("c").await.unwrap();
        for (server, shard) in [
            ("a", Shard::new(600, 700)),
            ("c", Shard::new(0, 50)),
            ("b", Shard::new(640, 680)),
            ("a", Shard::new(0, 999)),
        ] {
            master.move_shard(server, shard).await.unwrap();
            assert_partitions_keyspace(&master.query().await);
        }
        // The last move handed everything to a single server.
        let config = master.query().await;
        assert_eq!(config[0].shards, vec![Shard::new(0, 999)]);
        assert!(config[1].shards.is_empty());
        assert!(config[2].shards.is_empty());
    }

    // ============================================================
    // QUERY & GDPR DELETE
    // ============================================================

    #[tokio::test]
    async fn query_on_an_empty_cluster_is_empty() {
        let master = ShardMaster::new();
        assert!(master.query().await.is_empty());
    }

    #[tokio::test]
    async fn gdpr_delete_rejects_bad_keys() {
        let master = ShardMaster::new();
        assert_eq!(master.gdpr_delete("").await, Err(StoreError::EmptyKey));
        assert_eq!(
            master.gdpr_delete("all_users").await,
            Err(StoreError::IllegalKey("all_users".to_string()))
        );
        assert_eq!(
            master.gdpr_delete("bogus").await,
            Err(StoreError::MalformedKey("bogus".to_string()))
        );
    }

    #[tokio::test]
    async fn gdpr_delete_on_an_empty_cluster_has_nobody_to_call() {
        let master = ShardMaster::new();
        // No server covers the id, so the fan-out is empty and succeeds.
        master.gdpr_delete("user_7").await.unwrap();
    }
}
