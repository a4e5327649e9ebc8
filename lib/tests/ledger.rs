use std::{collections::HashMap, future::Future, sync::Arc};

use dispute_ledger::{
    chain::{self, ChainClient, ContractAddresses},
    math::fixed_point::Decimal,
    node::Node,
    reporting_fees::{
        CrowdsourcerState, InitialReporterState, NonforkedMarket,
    },
    state::{self, ReportingState},
    types::{
        Address, Amount, CrowdsourcerId, FeeWindowId, InitialReporterId, Log,
        LogBatch, MarketId, PayoutNumerators, TokenId, UniverseId,
    },
};
use parking_lot::Mutex;
use tempfile::TempDir;

const CASH: TokenId = TokenId(Address([0xCA; 20]));
const UNIVERSE: UniverseId = UniverseId(Address([0x01; 20]));
const FEE_WINDOW: FeeWindowId = FeeWindowId(Address([0x02; 20]));
const FEE_TOKEN: TokenId = TokenId(Address([0x03; 20]));
const MARKET: MarketId = MarketId(Address([0x04; 20]));
const REPORTER: Address = Address([0x05; 20]);
const OTHER: Address = Address([0x06; 20]);
const SIBLING: MarketId = MarketId(Address([0x07; 20]));
const CHILD: UniverseId = UniverseId(Address([0x08; 20]));

#[derive(Default)]
struct Positions {
    raw: HashMap<(MarketId, Address), Vec<i128>>,
    unavailable: bool,
}

#[derive(Clone, Default)]
struct MockClient(Arc<Mutex<Positions>>);

impl MockClient {
    fn set_position(&self, market: MarketId, account: Address, raw: Vec<i128>) {
        self.0.lock().raw.insert((market, account), raw);
    }

    fn set_unavailable(&self, unavailable: bool) {
        self.0.lock().unavailable = unavailable;
    }
}

impl ChainClient for MockClient {
    fn get_position_in_market(
        &self,
        market: &MarketId,
        account: &Address,
        _tick_size: &Decimal,
    ) -> impl Future<Output = Result<Vec<i128>, chain::Error>> + Send {
        let positions = self.0.lock();
        let res = if positions.unavailable {
            Err(chain::Error::Transport("connection refused".into()))
        } else {
            Ok(positions
                .raw
                .get(&(*market, *account))
                .cloned()
                .unwrap_or_default())
        };
        std::future::ready(res)
    }

    fn contract_addresses(
        &self,
    ) -> impl Future<Output = Result<ContractAddresses, chain::Error>> + Send
    {
        std::future::ready(Ok(ContractAddresses { cash: CASH }))
    }
}

async fn open_node() -> (TempDir, MockClient, Node<MockClient>) {
    let datadir = tempfile::tempdir().unwrap();
    let client = MockClient::default();
    let node = Node::new(datadir.path(), client.clone()).await.unwrap();
    (datadir, client, node)
}

fn batch(block_number: u64, timestamp: u64, logs: Vec<Log>) -> LogBatch {
    LogBatch {
        block_number,
        timestamp,
        logs,
    }
}

fn setup_logs() -> Vec<Log> {
    vec![
        Log::UniverseCreated {
            universe: UNIVERSE,
            parent_universe: None,
        },
        Log::FeeWindowCreated {
            fee_window: FEE_WINDOW,
            universe: UNIVERSE,
            fee_token: FEE_TOKEN,
            start_time: 0,
            end_time: 100,
        },
        Log::MarketCreated {
            market: MARKET,
            universe: UNIVERSE,
            min_price: Decimal::zero(),
            max_price: Decimal::from_integer(1),
            num_ticks: 1000,
        },
    ]
}

fn mint(token: TokenId, target: Address, amount: u128) -> Log {
    Log::TokensMinted {
        token,
        target,
        amount: Amount(amount),
    }
}

fn state_error(err: &dispute_ledger::node::Error) -> &state::Error {
    err.state_error().expect("state error")
}

#[tokio::test]
async fn participation_token_share_of_past_window() {
    let (_datadir, _client, node) = open_node().await;
    let mut logs = setup_logs();
    logs.extend([
        mint(FEE_TOKEN, OTHER, 300),
        mint(FEE_WINDOW.into(), REPORTER, 350),
        mint(FEE_WINDOW.into(), OTHER, 350),
        mint(CASH, FEE_WINDOW.0, 100),
    ]);
    node.apply_log_batch(batch(1, 200, logs)).await.unwrap();
    let details = node
        .get_reporting_fees(Some(REPORTER), Some(UNIVERSE))
        .await
        .unwrap();
    assert_eq!(details.total.unclaimed_eth, Amount(35));
    assert_eq!(details.total.unclaimed_fork_eth, Amount(35));
    assert_eq!(details.total.lost_rep, Amount(0));
    assert_eq!(details.fee_windows, vec![FEE_WINDOW]);
    assert!(details.forked_market.is_none());
}

#[tokio::test]
async fn current_window_pays_no_participation_fees() {
    let (_datadir, _client, node) = open_node().await;
    let mut logs = setup_logs();
    logs.extend([
        mint(FEE_WINDOW.into(), REPORTER, 350),
        mint(CASH, FEE_WINDOW.0, 100),
    ]);
    node.apply_log_batch(batch(1, 50, logs)).await.unwrap();
    let details = node
        .get_reporting_fees(Some(REPORTER), Some(UNIVERSE))
        .await
        .unwrap();
    assert_eq!(details.total.unclaimed_eth, Amount(0));
    assert!(details.fee_windows.is_empty());
}

#[tokio::test]
async fn unknown_universe_is_not_found() {
    let (_datadir, _client, node) = open_node().await;
    node.apply_log_batch(batch(1, 0, setup_logs())).await.unwrap();
    let unknown = UniverseId(Address([0x77; 20]));
    let err = node
        .get_reporting_fees(Some(REPORTER), Some(unknown))
        .await
        .unwrap_err();
    assert!(matches!(
        state_error(&err),
        state::Error::UniverseNotFound { universe } if *universe == unknown
    ));
}

#[tokio::test]
async fn missing_arguments_are_rejected() {
    let (_datadir, _client, node) = open_node().await;
    let err = node
        .get_reporting_fees(None, Some(UNIVERSE))
        .await
        .unwrap_err();
    assert!(matches!(
        state_error(&err),
        state::Error::MissingArgument("reporter")
    ));
    let err = node.get_reporting_fees(Some(REPORTER), None).await.unwrap_err();
    assert!(matches!(
        state_error(&err),
        state::Error::MissingArgument("universe")
    ));
}

#[tokio::test]
async fn finalized_stake_splits_into_winning_and_lost() {
    let (_datadir, _client, node) = open_node().await;
    let winner = Address([0x10; 20]);
    let loser = Address([0x11; 20]);
    let second_market = MarketId(Address([0x12; 20]));
    let mut logs = setup_logs();
    logs.extend([
        Log::MarketCreated {
            market: second_market,
            universe: UNIVERSE,
            min_price: Decimal::zero(),
            max_price: Decimal::from_integer(1),
            num_ticks: 1000,
        },
        Log::DisputeCrowdsourcerCreated {
            market: MARKET,
            crowdsourcer: CrowdsourcerId(winner),
            fee_window: FEE_WINDOW,
            payout_numerators: numerators(&[0, 1000]),
            invalid: false,
            size: Amount(40),
        },
        Log::DisputeCrowdsourcerCreated {
            market: second_market,
            crowdsourcer: CrowdsourcerId(loser),
            fee_window: FEE_WINDOW,
            payout_numerators: numerators(&[1000, 0]),
            invalid: false,
            size: Amount(30),
        },
        mint(TokenId(winner), REPORTER, 40),
        mint(TokenId(loser), REPORTER, 30),
        Log::MarketFinalized {
            market: MARKET,
            winning_payout_numerators: numerators(&[0, 1000]),
            invalid: false,
        },
        Log::MarketFinalized {
            market: second_market,
            winning_payout_numerators: numerators(&[0, 1000]),
            invalid: false,
        },
    ]);
    node.apply_log_batch(batch(1, 50, logs)).await.unwrap();
    let details = node
        .get_reporting_fees(Some(REPORTER), Some(UNIVERSE))
        .await
        .unwrap();
    assert_eq!(details.total.unclaimed_rep_staked, Amount(40));
    assert_eq!(details.total.unclaimed_rep_earned, Amount(20));
    assert_eq!(details.total.lost_rep, Amount(30));
    assert_eq!(details.nonforked_markets.len(), 2);
}

#[tokio::test]
async fn order_fill_projects_both_sides() {
    let (_datadir, client, node) = open_node().await;
    client.set_position(MARKET, REPORTER, vec![0, 500]);
    client.set_position(MARKET, OTHER, vec![0, -500]);
    node.apply_log_batch(batch(1, 0, setup_logs())).await.unwrap();
    let positions = node
        .apply_log_batch(batch(
            2,
            10,
            vec![Log::OrderFilled {
                market: MARKET,
                creator: REPORTER,
                filler: OTHER,
            }],
        ))
        .await
        .unwrap();
    assert_eq!(positions.len(), 4);
    let stored = node.get_positions(REPORTER, MARKET).unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[1].outcome, 1);
    assert_eq!(stored[1].amount, "0.5".parse::<Decimal>().unwrap());
    let stored = node.get_positions(OTHER, MARKET).unwrap();
    assert_eq!(stored[1].amount, "-0.5".parse::<Decimal>().unwrap());
}

#[tokio::test]
async fn refresh_replaces_previous_rows() {
    let (_datadir, client, node) = open_node().await;
    node.apply_log_batch(batch(1, 0, setup_logs())).await.unwrap();
    client.set_position(MARKET, REPORTER, vec![100, 200, 300]);
    let first = node.refresh_position(MARKET, REPORTER).await.unwrap();
    let again = node.refresh_position(MARKET, REPORTER).await.unwrap();
    assert_eq!(first, again);
    assert_eq!(node.get_positions(REPORTER, MARKET).unwrap(), first);
    client.set_position(MARKET, REPORTER, vec![7]);
    let replaced = node.refresh_position(MARKET, REPORTER).await.unwrap();
    assert_eq!(replaced.len(), 1);
    assert_eq!(node.get_positions(REPORTER, MARKET).unwrap(), replaced);
}

#[tokio::test]
async fn concurrent_refreshes_of_one_key_agree() {
    let (_datadir, client, node) = open_node().await;
    node.apply_log_batch(batch(1, 0, setup_logs())).await.unwrap();
    client.set_position(MARKET, REPORTER, vec![1, 2]);
    let (first, second) = tokio::join!(
        node.refresh_position(MARKET, REPORTER),
        node.refresh_position(MARKET, REPORTER),
    );
    assert_eq!(first.unwrap(), second.unwrap());
    assert_eq!(node.get_positions(REPORTER, MARKET).unwrap().len(), 2);
}

#[tokio::test]
async fn unavailable_client_keeps_stored_positions() {
    let (_datadir, client, node) = open_node().await;
    node.apply_log_batch(batch(1, 0, setup_logs())).await.unwrap();
    client.set_position(MARKET, REPORTER, vec![0, 500]);
    let stored = node.refresh_position(MARKET, REPORTER).await.unwrap();
    client.set_unavailable(true);
    let err = node.refresh_position(MARKET, REPORTER).await.unwrap_err();
    assert!(matches!(
        state_error(&err),
        state::Error::CollaboratorUnavailable(_)
    ));
    assert_eq!(node.get_positions(REPORTER, MARKET).unwrap(), stored);
}

#[tokio::test]
async fn refresh_of_unknown_market_fails() {
    let (_datadir, _client, node) = open_node().await;
    let err = node.refresh_position(MARKET, REPORTER).await.unwrap_err();
    assert!(matches!(
        state_error(&err),
        state::Error::MarketNotFound { .. }
    ));
}

#[tokio::test]
async fn stale_batches_are_rejected() {
    let (_datadir, _client, node) = open_node().await;
    node.apply_log_batch(batch(5, 0, setup_logs())).await.unwrap();
    let err = node
        .apply_log_batch(batch(4, 0, vec![mint(CASH, OTHER, 1)]))
        .await
        .unwrap_err();
    assert!(matches!(
        state_error(&err),
        state::Error::StaleBatch {
            block_number: 4,
            last: 5
        }
    ));
}

#[tokio::test]
async fn failed_batch_leaves_no_trace() {
    let (_datadir, _client, node) = open_node().await;
    node.apply_log_batch(batch(1, 200, setup_logs())).await.unwrap();
    let err = node
        .apply_log_batch(batch(
            2,
            200,
            vec![
                mint(FEE_WINDOW.into(), REPORTER, 10),
                Log::TokensBurned {
                    token: CASH,
                    target: OTHER,
                    amount: Amount(1),
                },
            ],
        ))
        .await
        .unwrap_err();
    assert!(matches!(
        state_error(&err),
        state::Error::AmountUnderflow { .. }
    ));
    let details = node
        .get_reporting_fees(Some(REPORTER), Some(UNIVERSE))
        .await
        .unwrap();
    assert!(details.fee_windows.is_empty());
}

#[tokio::test]
async fn universe_without_fee_windows_is_not_found() {
    let (_datadir, _client, node) = open_node().await;
    node.apply_log_batch(batch(
        1,
        0,
        vec![Log::UniverseCreated {
            universe: UNIVERSE,
            parent_universe: None,
        }],
    ))
    .await
    .unwrap();
    let err = node
        .get_reporting_fees(Some(REPORTER), Some(UNIVERSE))
        .await
        .unwrap_err();
    assert!(matches!(
        state_error(&err),
        state::Error::UniverseNotFound { universe } if *universe == UNIVERSE
    ));
}

#[tokio::test]
async fn replayed_batch_is_rejected() {
    let (_datadir, _client, node) = open_node().await;
    let mut logs = setup_logs();
    logs.extend([
        mint(FEE_WINDOW.into(), REPORTER, 350),
        mint(FEE_WINDOW.into(), OTHER, 650),
        mint(CASH, FEE_WINDOW.0, 100),
    ]);
    let block = batch(1, 200, logs);
    node.apply_log_batch(block.clone()).await.unwrap();
    let err = node.apply_log_batch(block).await.unwrap_err();
    assert!(matches!(
        state_error(&err),
        state::Error::StaleBatch {
            block_number: 1,
            last: 1
        }
    ));
    let details = node
        .get_reporting_fees(Some(REPORTER), Some(UNIVERSE))
        .await
        .unwrap();
    assert_eq!(details.total.unclaimed_eth, Amount(35));
}

#[tokio::test]
async fn crowdsourcer_balance_above_size_is_inconsistent() {
    let (_datadir, _client, node) = open_node().await;
    let crowdsourcer = Address([0x20; 20]);
    let mut logs = setup_logs();
    logs.extend([
        Log::DisputeCrowdsourcerCreated {
            market: MARKET,
            crowdsourcer: CrowdsourcerId(crowdsourcer),
            fee_window: FEE_WINDOW,
            payout_numerators: numerators(&[0, 1000]),
            invalid: false,
            size: Amount(10),
        },
        mint(TokenId(crowdsourcer), REPORTER, 20),
        mint(CASH, crowdsourcer, 100),
        Log::MarketFinalized {
            market: MARKET,
            winning_payout_numerators: numerators(&[0, 1000]),
            invalid: false,
        },
    ]);
    node.apply_log_batch(batch(1, 50, logs)).await.unwrap();
    let err = node
        .get_reporting_fees(Some(REPORTER), Some(UNIVERSE))
        .await
        .unwrap_err();
    assert!(matches!(
        state_error(&err),
        state::Error::InconsistentSupply {
            token,
            balance: Amount(20),
            supply: Amount(10),
        } if *token == TokenId(crowdsourcer)
    ));
}

#[tokio::test]
async fn fork_tags_participants_of_the_forking_market() {
    let (_datadir, _client, node) = open_node().await;
    let crowdsourcer = Address([0x21; 20]);
    let initial_reporter = Address([0x22; 20]);
    let mut logs = setup_logs();
    logs.extend([
        Log::DisputeCrowdsourcerCreated {
            market: MARKET,
            crowdsourcer: CrowdsourcerId(crowdsourcer),
            fee_window: FEE_WINDOW,
            payout_numerators: numerators(&[0, 1000]),
            invalid: false,
            size: Amount(40),
        },
        mint(TokenId(crowdsourcer), REPORTER, 40),
        mint(CASH, crowdsourcer, 10),
        Log::InitialReportSubmitted {
            market: MARKET,
            initial_reporter: InitialReporterId(initial_reporter),
            reporter: REPORTER,
            fee_window: FEE_WINDOW,
            payout_numerators: numerators(&[1000, 0]),
            invalid: false,
            amount_staked: Amount(25),
        },
        mint(CASH, initial_reporter, 6),
        Log::UniverseForked {
            universe: UNIVERSE,
            forking_market: MARKET,
        },
    ]);
    node.apply_log_batch(batch(1, 50, logs)).await.unwrap();
    let details = node
        .get_reporting_fees(Some(REPORTER), Some(UNIVERSE))
        .await
        .unwrap();
    // Forking stakes are unclaimed on the fork, whatever their payout
    assert_eq!(details.total.unclaimed_fork_rep_staked, Amount(65));
    assert_eq!(details.total.unclaimed_rep_staked, Amount(0));
    assert_eq!(details.total.lost_rep, Amount(0));
    assert_eq!(details.total.unclaimed_fork_eth, Amount(0));
    let forked = details.forked_market.expect("forked market");
    assert_eq!(forked.market_id, MARKET);
    assert_eq!(forked.universe, UNIVERSE);
    assert!(!forked.is_finalized);
    assert!(forked.crowdsourcers.is_empty());
    assert!(forked.initial_reporter.is_none());
    assert!(details.nonforked_markets.is_empty());

    node.apply_log_batch(batch(
        2,
        60,
        vec![Log::ReportingStateChanged {
            market: MARKET,
            reporting_state: ReportingState::AwaitingFinalization,
        }],
    ))
    .await
    .unwrap();
    let details = node
        .get_reporting_fees(Some(REPORTER), Some(UNIVERSE))
        .await
        .unwrap();
    assert_eq!(details.total.unclaimed_fork_rep_staked, Amount(65));
    assert_eq!(details.total.unclaimed_fork_eth, Amount(16));
    assert_eq!(details.total.unclaimed_eth, Amount(0));
    let forked = details.forked_market.expect("forked market");
    assert_eq!(
        forked.crowdsourcers,
        vec![CrowdsourcerState {
            crowdsourcer_id: CrowdsourcerId(crowdsourcer),
            needs_fork: true,
        }]
    );
    assert_eq!(
        forked.initial_reporter,
        Some(InitialReporterState {
            initial_reporter_id: InitialReporterId(initial_reporter),
            needs_fork: true,
        })
    );
}

fn sibling_stake_logs(crowdsourcer: Address) -> Vec<Log> {
    let mut logs = setup_logs();
    logs.extend([
        Log::MarketCreated {
            market: SIBLING,
            universe: UNIVERSE,
            min_price: Decimal::zero(),
            max_price: Decimal::from_integer(1),
            num_ticks: 1000,
        },
        Log::DisputeCrowdsourcerCreated {
            market: SIBLING,
            crowdsourcer: CrowdsourcerId(crowdsourcer),
            fee_window: FEE_WINDOW,
            payout_numerators: numerators(&[0, 1000]),
            invalid: false,
            size: Amount(30),
        },
        mint(TokenId(crowdsourcer), REPORTER, 30),
        mint(CASH, crowdsourcer, 9),
        Log::UniverseForked {
            universe: UNIVERSE,
            forking_market: MARKET,
        },
        Log::MarketParticipantsDisavowed { market: SIBLING },
    ]);
    logs
}

#[tokio::test]
async fn disavowed_stake_counts_until_redeemed() {
    let (_datadir, _client, node) = open_node().await;
    let crowdsourcer = Address([0x23; 20]);
    node.apply_log_batch(batch(1, 50, sibling_stake_logs(crowdsourcer)))
        .await
        .unwrap();
    let details = node
        .get_reporting_fees(Some(REPORTER), Some(UNIVERSE))
        .await
        .unwrap();
    assert_eq!(
        details.nonforked_markets,
        vec![NonforkedMarket {
            market_id: SIBLING,
            universe: UNIVERSE,
            crowdsourcers_are_disavowed: true,
            is_finalized: false,
            is_migrated: false,
            crowdsourcers: vec![CrowdsourcerId(crowdsourcer)],
            initial_reporter: None,
        }]
    );
    assert_eq!(details.total.unclaimed_eth, Amount(9));
    assert_eq!(details.total.unclaimed_fork_eth, Amount(0));
    // Neither forking nor finalized, so no staked bucket applies
    assert_eq!(details.total.unclaimed_rep_staked, Amount(0));
    assert_eq!(details.total.lost_rep, Amount(0));
    assert_eq!(
        details.forked_market.map(|forked| forked.market_id),
        Some(MARKET)
    );

    node.apply_log_batch(batch(
        2,
        60,
        vec![Log::TokensBurned {
            token: TokenId(crowdsourcer),
            target: REPORTER,
            amount: Amount(30),
        }],
    ))
    .await
    .unwrap();
    let details = node
        .get_reporting_fees(Some(REPORTER), Some(UNIVERSE))
        .await
        .unwrap();
    assert!(details.nonforked_markets.is_empty());
    assert_eq!(details.total.unclaimed_eth, Amount(0));
}

#[tokio::test]
async fn migrated_market_moves_to_new_universe() {
    let (_datadir, _client, node) = open_node().await;
    let crowdsourcer = Address([0x24; 20]);
    let mut logs = sibling_stake_logs(crowdsourcer);
    logs.extend([
        Log::UniverseCreated {
            universe: CHILD,
            parent_universe: Some(UNIVERSE),
        },
        Log::FeeWindowCreated {
            fee_window: FeeWindowId(Address([0x25; 20])),
            universe: CHILD,
            fee_token: TokenId(Address([0x26; 20])),
            start_time: 0,
            end_time: 100,
        },
    ]);
    node.apply_log_batch(batch(1, 50, logs)).await.unwrap();
    node.apply_log_batch(batch(
        2,
        60,
        vec![Log::MarketMigrated {
            market: SIBLING,
            original_universe: UNIVERSE,
            new_universe: CHILD,
        }],
    ))
    .await
    .unwrap();
    let details = node
        .get_reporting_fees(Some(REPORTER), Some(CHILD))
        .await
        .unwrap();
    assert_eq!(details.nonforked_markets.len(), 1);
    let migrated = &details.nonforked_markets[0];
    assert_eq!(migrated.market_id, SIBLING);
    assert_eq!(migrated.universe, CHILD);
    assert!(migrated.is_migrated);
    assert!(details.forked_market.is_none());
    let details = node
        .get_reporting_fees(Some(REPORTER), Some(UNIVERSE))
        .await
        .unwrap();
    assert!(details.nonforked_markets.is_empty());

    let err = node
        .apply_log_batch(batch(
            3,
            70,
            vec![Log::MarketMigrated {
                market: SIBLING,
                original_universe: UNIVERSE,
                new_universe: CHILD,
            }],
        ))
        .await
        .unwrap_err();
    assert!(matches!(
        state_error(&err),
        state::Error::MarketMigrationMismatch { market, .. } if *market == SIBLING
    ));
}

#[tokio::test]
async fn redeemed_stakes_are_excluded() {
    let (_datadir, _client, node) = open_node().await;
    let winner = Address([0x27; 20]);
    let loser = Address([0x28; 20]);
    let initial_reporter = Address([0x29; 20]);
    let mut logs = setup_logs();
    logs.extend([
        Log::InitialReportSubmitted {
            market: MARKET,
            initial_reporter: InitialReporterId(initial_reporter),
            reporter: REPORTER,
            fee_window: FEE_WINDOW,
            payout_numerators: numerators(&[0, 1000]),
            invalid: false,
            amount_staked: Amount(20),
        },
        Log::DisputeCrowdsourcerCreated {
            market: MARKET,
            crowdsourcer: CrowdsourcerId(winner),
            fee_window: FEE_WINDOW,
            payout_numerators: numerators(&[0, 1000]),
            invalid: false,
            size: Amount(40),
        },
        Log::DisputeCrowdsourcerCreated {
            market: MARKET,
            crowdsourcer: CrowdsourcerId(loser),
            fee_window: FEE_WINDOW,
            payout_numerators: numerators(&[1000, 0]),
            invalid: false,
            size: Amount(15),
        },
        mint(TokenId(winner), REPORTER, 40),
        mint(TokenId(loser), REPORTER, 15),
        mint(CASH, winner, 10),
        mint(CASH, initial_reporter, 6),
        Log::MarketFinalized {
            market: MARKET,
            winning_payout_numerators: numerators(&[0, 1000]),
            invalid: false,
        },
    ]);
    node.apply_log_batch(batch(1, 50, logs)).await.unwrap();
    let details = node
        .get_reporting_fees(Some(REPORTER), Some(UNIVERSE))
        .await
        .unwrap();
    assert_eq!(details.total.unclaimed_rep_staked, Amount(60));
    assert_eq!(details.total.unclaimed_rep_earned, Amount(30));
    assert_eq!(details.total.lost_rep, Amount(15));
    assert_eq!(details.total.unclaimed_eth, Amount(16));
    assert_eq!(details.nonforked_markets.len(), 1);
    assert_eq!(details.nonforked_markets[0].crowdsourcers.len(), 2);
    assert_eq!(
        details.nonforked_markets[0].initial_reporter,
        Some(InitialReporterId(initial_reporter))
    );

    node.apply_log_batch(batch(
        2,
        60,
        vec![
            Log::TokensBurned {
                token: TokenId(winner),
                target: REPORTER,
                amount: Amount(40),
            },
            Log::TokensBurned {
                token: TokenId(loser),
                target: REPORTER,
                amount: Amount(15),
            },
            Log::InitialReporterRedeemed {
                market: MARKET,
                reporter: REPORTER,
            },
        ],
    ))
    .await
    .unwrap();
    let details = node
        .get_reporting_fees(Some(REPORTER), Some(UNIVERSE))
        .await
        .unwrap();
    assert_eq!(details.total.unclaimed_rep_staked, Amount(0));
    assert_eq!(details.total.unclaimed_rep_earned, Amount(0));
    assert_eq!(details.total.lost_rep, Amount(0));
    assert_eq!(details.total.unclaimed_eth, Amount(0));
    assert!(details.nonforked_markets.is_empty());
}

fn numerators(values: &[u64]) -> PayoutNumerators {
    PayoutNumerators(values.to_vec())
}
