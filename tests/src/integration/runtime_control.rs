//! # Runtime Control
//!
//! Spawns the full actor set under `tokio::time::pause` and drives it with
//! control commands over virtual time: actors start idle, `Run` sets the
//! ledger in motion, `Pause` freezes every replica exactly where it is,
//! `Run` resumes, and `Exit` terminates every task.

#[cfg(test)]
mod tests {
    use crate::support::assert_snapshot_invariants;
    use node_runtime::{wiring, QueryHandle};
    use shared_types::{BoundedRange, Command, Hash, ParamsHandle, SimParams};
    use std::time::Duration;
    use tokio::time::{sleep, timeout};

    fn fast_params(shard_count: usize) -> ParamsHandle {
        ParamsHandle::new(SimParams {
            shard_count,
            finalize_probability: 1.0,
            finalize_period: BoundedRange::new(2, 3),
            block_probability: 1.0,
            block_period: BoundedRange::new(1, 2),
            tx_period: BoundedRange::new(1, 1),
            ..SimParams::default()
        })
    }

    /// Advance virtual time in small steps until `check` passes, panicking
    /// once the budget runs out.
    async fn advance_until(label: &str, mut check: impl FnMut() -> bool) {
        for _ in 0..120 {
            if check() {
                return;
            }
            sleep(Duration::from_secs(5)).await;
        }
        panic!("not reached within the virtual time budget: {label}");
    }

    /// One comparable line per (observer, shard) replica plus each
    /// observer's applied finalization height.
    fn fingerprint(query: &QueryHandle, shard_count: usize) -> Vec<(Vec<(Hash, bool, bool)>, u64)> {
        let mut lines = Vec::new();
        for observer in 0..=shard_count {
            for shard in 1..=shard_count {
                let snapshot = query.chain_snapshot(observer, shard).unwrap();
                let nodes = snapshot
                    .nodes
                    .iter()
                    .map(|node| (node.digest, node.valid, node.finalized))
                    .collect();
                lines.push((nodes, query.finalization_height(observer).unwrap()));
            }
        }
        lines
    }

    #[tokio::test(start_paused = true)]
    async fn actors_stay_idle_until_run() {
        let simulation = wiring::spawn_seeded(fast_params(2), 11);
        sleep(Duration::from_secs(60)).await;

        let query = simulation.query();
        for observer in 0..=2 {
            for shard in 1..=2 {
                let (_, height) = query.longest_tip(observer, shard).unwrap();
                assert_eq!(height, 0, "observer {observer} saw growth before Run");
            }
            assert_eq!(query.finalization_height(observer).unwrap(), 0);
        }
        simulation.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn run_grows_chains_and_advances_finalization() {
        let simulation = wiring::spawn_seeded(fast_params(2), 17);
        simulation.control(Command::Run);

        let query = simulation.query().clone();
        advance_until("shard 1 builds its own chain", || {
            query.longest_tip(1, 1).unwrap().1 >= 3
        })
        .await;
        advance_until("beacon completes finalization rounds", || {
            query.finalization_height(0).unwrap() >= 2
        })
        .await;
        advance_until("shard 1 applies a finalization round", || {
            query.finalization_height(1).unwrap() >= 1
        })
        .await;

        for observer in 0..=2 {
            for shard in 1..=2 {
                assert_snapshot_invariants(&query.chain_snapshot(observer, shard).unwrap());
            }
        }
        simulation.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn block_timer_survives_a_strictly_faster_transaction_timer() {
        // the transaction timer always fires first here; blocks still have
        // to appear, so the block timer must keep its deadline across
        // handled events instead of being re-armed every iteration
        let params = ParamsHandle::new(SimParams {
            shard_count: 2,
            finalize_probability: 1.0,
            finalize_period: BoundedRange::new(3, 3),
            block_probability: 1.0,
            block_period: BoundedRange::new(2, 2),
            tx_period: BoundedRange::new(1, 1),
            ..SimParams::default()
        });
        let simulation = wiring::spawn_seeded(params, 37);
        simulation.control(Command::Run);

        let query = simulation.query().clone();
        advance_until("blocks appear despite the faster timer", || {
            query.longest_tip(1, 1).unwrap().1 >= 3
        })
        .await;
        simulation.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn pause_freezes_every_replica_until_the_next_run() {
        let simulation = wiring::spawn_seeded(fast_params(2), 23);
        simulation.control(Command::Run);

        let query = simulation.query().clone();
        advance_until("initial growth", || query.longest_tip(1, 1).unwrap().1 >= 2).await;

        simulation.control(Command::Pause);
        // let in-flight events land before taking the reference picture
        sleep(Duration::from_secs(5)).await;
        let frozen = fingerprint(&query, 2);

        sleep(Duration::from_secs(300)).await;
        assert_eq!(fingerprint(&query, 2), frozen, "replica changed while paused");

        simulation.control(Command::Run);
        let resumed_from = query.longest_tip(1, 1).unwrap().1;
        advance_until("growth resumes after Run", || {
            query.longest_tip(1, 1).unwrap().1 > resumed_from
        })
        .await;
        simulation.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn exit_terminates_every_actor_task() {
        let simulation = wiring::spawn_seeded(fast_params(3), 29);
        simulation.control(Command::Run);
        sleep(Duration::from_secs(20)).await;

        timeout(Duration::from_secs(30), simulation.shutdown())
            .await
            .expect("actors did not exit within one wait cycle");
    }

    #[tokio::test(start_paused = true)]
    async fn exit_is_honored_even_while_paused() {
        let simulation = wiring::spawn_seeded(fast_params(2), 31);
        // never sent Run: actors are idling on the control queue
        timeout(Duration::from_secs(30), simulation.shutdown())
            .await
            .expect("paused actors did not exit");
    }
}
