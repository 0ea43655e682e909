//! End-to-end tests: roster → history → search → leaders → save/load.

use std::collections::BTreeSet;
use std::fs;

use chrono::NaiveDate;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use u_grouping::leader::{LeadTally, LeaderAdjuster, LeadOccasions};
use u_grouping::models::{Grouping, Permutation};
use u_grouping::roster::Roster;
use u_grouping::round::plan_round;
use u_grouping::search::{CandidateScore, SearchControl, SearchRequest, Strategy};
use u_grouping::similarity::Weighting;
use u_grouping::{store, GroupingError};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn roster(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("person{i:02}@example.org")).collect()
}

#[test]
fn eight_people_make_two_groups_of_four() {
    let people = ["a", "b", "c", "d", "e", "f", "g", "h"];
    let mut rng = SmallRng::seed_from_u64(2024);
    let round = u_grouping::partition::randomise(&people[..], 4, &mut rng).unwrap();
    assert_eq!(round.group_count(), 2);
    assert!(round.groups.iter().all(|g| g.len() == 4));
    assert_eq!(round.participants(), people.into_iter().collect::<BTreeSet<_>>());
}

#[test]
fn identical_round_scores_three_per_person() {
    let previous = Permutation::new(
        day(2024, 1, 1),
        vec![Grouping::new("a", ["b", "c", "d"]), Grouping::new("e", ["f", "g", "h"])],
    );
    let next = Permutation::new(day(2024, 1, 15), previous.groups.clone());
    let stats = next.similarity_to(&previous, Weighting::Linear).unwrap();
    assert!((stats.per_person_score - 3.0).abs() < 1e-10);
    let expected: Vec<(&str, usize)> = ["a", "b", "c", "d", "e", "f", "g", "h"]
        .into_iter()
        .map(|p| (p, 3))
        .collect();
    let actual: Vec<(&str, usize)> = stats
        .persons_with_repeats
        .iter()
        .map(|(k, v)| (k.as_str(), *v))
        .collect();
    assert_eq!(actual, expected);
}

#[test]
fn several_rounds_without_repeating_the_previous_one() {
    let people = roster(22);
    let mut rng = SmallRng::seed_from_u64(17);
    let mut history: Vec<Permutation> = Vec::new();
    let strategy = Strategy::BestOf {
        attempts: 20_000,
        parallel: false,
    };
    let control = SearchControl::new();
    let adjuster = LeaderAdjuster::new();

    for week in 0..6u32 {
        let request = SearchRequest::new(people.clone(), 4)
            .with_history(history.clone())
            .with_date(day(2024, 1, 1) + chrono::Days::new(u64::from(week) * 14));
        let round = plan_round(&request, &strategy, &control, &adjuster, &mut rng).unwrap();

        assert_eq!(round.participant_count(), people.len());
        assert!(round.groups.iter().all(|g| g.len() == 4 || g.len() == 5));
        if !history.is_empty() {
            let score = CandidateScore::calculate(&round, &history).unwrap();
            assert!(score.is_perfect(), "week {week} repeated a pairing");
        }
        history.insert(0, round);
    }

    // Rotation spreads leadership: nobody led in more than half the rounds.
    let tally = LeadTally::from_history(&history);
    for p in &people {
        let record = tally.record(p).unwrap();
        assert!(record.led <= 3, "{p} led {} times", record.led);
    }
}

#[test]
fn target_search_with_timeout_control() {
    let people = roster(12);
    let previous = Permutation::new(
        day(2024, 2, 1),
        people
            .chunks(3)
            .map(|c| Grouping::new(c[0].as_str(), c[1..].iter().map(String::as_str)))
            .collect(),
    );
    let request = SearchRequest::new(people, 3).with_history(vec![previous]);
    let control = SearchControl::new()
        .with_max_attempts(200_000)
        .with_timeout(std::time::Duration::from_secs(30));
    let mut rng = SmallRng::seed_from_u64(8);

    let round = Strategy::UntilTarget { target: 0.01 }
        .run(&request, &control, &mut rng)
        .unwrap();
    let score = CandidateScore::calculate(&round, &request.history).unwrap();
    assert!(score.is_perfect());
}

#[test]
fn lead_occasions_example_is_deterministic() {
    let history = vec![
        Permutation::new(day(2024, 3, 4), vec![Grouping::new("a", ["b"]), Grouping::new("c", ["x"])]),
        Permutation::new(day(2024, 2, 19), vec![Grouping::new("a", ["y"])]),
    ];
    let round = Permutation::new(day(2024, 3, 18), vec![Grouping::new("c", ["a", "b"])]);
    for seed in 0..16 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let adjusted = LeaderAdjuster::new()
            .with_metric(LeadOccasions)
            .adjust(&round, &history, &mut rng);
        assert_eq!(adjusted.groups[0].leader(), "b");
    }
}

#[test]
fn save_and_reload_history() {
    let dir = tempfile::tempdir().unwrap();
    let people = roster(9);
    let mut rng = SmallRng::seed_from_u64(3);

    let mut saved = Vec::new();
    for (i, date) in [day(2024, 1, 8), day(2024, 1, 22), day(2024, 2, 5)].into_iter().enumerate() {
        let round = u_grouping::partition::Partitioner::new(4)
            .with_date(date)
            .randomise(&people, &mut rng)
            .unwrap();
        let path = store::save_round(dir.path(), &round).unwrap();
        assert_eq!(path.file_name().unwrap(), format!("{date}.json").as_str());
        saved.push(round);
        assert_eq!(
            store::load_round(dir.path().join(store::LATEST_FILE)).unwrap(),
            saved[i]
        );
    }

    let history = store::load_history(dir.path()).unwrap();
    assert_eq!(history.len(), 3, ".latest.json must be skipped");
    assert_eq!(history[0].date, day(2024, 2, 5));
    assert_eq!(history[2].date, day(2024, 1, 8));
    for round in &history {
        let original = saved.iter().find(|s| s.date == round.date).unwrap();
        assert_eq!(round, original);
    }
}

#[test]
fn empty_history_directory() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        store::load_history(dir.path()),
        Err(GroupingError::EmptyHistory { .. })
    ));
    assert!(store::load_history_or_empty(dir.path()).unwrap().is_empty());
    assert!(store::load_history_or_empty(dir.path().join("missing"))
        .unwrap()
        .is_empty());
}

#[test]
fn roster_files_feed_the_search() {
    let dir = tempfile::tempdir().unwrap();
    let include = dir.path().join("include");
    let exclude = dir.path().join("exclude");
    let lines: Vec<String> = (0..10)
        .map(|i| format!("Person {i},p{i}@example.org"))
        .collect();
    fs::write(&include, lines.join("\n")).unwrap();
    fs::write(&exclude, "Person 3,p3@example.org\n").unwrap();

    let roster = Roster::load(&include, Some(exclude.as_path()), &["p7@example.org".to_string()])
        .unwrap();
    assert_eq!(roster.included.len(), 8);
    assert_eq!(roster.excluded.len(), 2);

    let request = SearchRequest::new(roster.participants(), 4);
    let mut rng = SmallRng::seed_from_u64(1);
    let round = Strategy::BestOf {
        attempts: 10,
        parallel: true,
    }
    .run(&request, &SearchControl::new(), &mut rng)
    .unwrap();
    assert_eq!(round.group_count(), 2);
    assert!(!round.participants().contains("p3@example.org"));
}
