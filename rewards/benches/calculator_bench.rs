use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use votereward_nullables::{NullBalanceSource, NullVoteSource};
use votereward_rewards::{EligibilityEvaluator, RewardCalculator, VoteWindow};
use votereward_types::{AccountId, Boundary, Percentage, TokenAmount, VoterState};

const DURATION: u64 = 5;

fn make_history(votes: u64, account: &AccountId) -> (NullVoteSource, NullBalanceSource) {
    let source = NullVoteSource::new(DURATION);
    let balances = NullBalanceSource::new();
    for i in 0..votes {
        let start = Boundary::new(i * 10);
        let id = source.new_vote(start);
        source.cast(id, account, VoterState::Yes);
        balances.mint(account, start, TokenAmount::new(10));
    }
    (source, balances)
}

fn bench_reward_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("reward_scan");
    let account = AccountId::from_index(1);
    let pct = Percentage::from_percent(42).unwrap();

    for vote_count in [10u64, 100, 1000] {
        let (source, balances) = make_history(vote_count, &account);
        let window =
            VoteWindow::new(Boundary::GENESIS, Boundary::new(vote_count * 10), DURATION).unwrap();
        let current = TokenAmount::new(vote_count as u128 * 10);

        group.bench_with_input(
            BenchmarkId::new("compute_reward", vote_count),
            &vote_count,
            |b, _| {
                let calculator = RewardCalculator::new(&source, &balances);
                b.iter(|| {
                    black_box(calculator.compute_reward(
                        black_box(&account),
                        black_box(&window),
                        pct,
                        current,
                        0,
                    ))
                });
            },
        );
    }

    group.finish();
}

fn bench_eligibility(c: &mut Criterion) {
    let mut group = c.benchmark_group("eligibility");
    let account = AccountId::from_index(1);

    for vote_count in [10u64, 100, 1000] {
        let (source, _) = make_history(vote_count, &account);
        let window =
            VoteWindow::new(Boundary::GENESIS, Boundary::new(vote_count * 10), DURATION).unwrap();

        group.bench_with_input(
            BenchmarkId::new("evaluate", vote_count),
            &vote_count,
            |b, _| {
                let evaluator = EligibilityEvaluator::new(&source);
                b.iter(|| black_box(evaluator.evaluate(black_box(&account), &window, 0)));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_reward_scan, bench_eligibility);
criterion_main!(benches);
