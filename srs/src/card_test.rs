use super::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use time::Duration;

fn now() -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(1_700_000_000).expect("valid timestamp")
}

fn card(deck_id: Uuid, front: &str, due_in_days: i64) -> Flashcard {
    let mut card = Flashcard::new(deck_id, front, "back", now()).expect("card");
    card.review.next_review = now() + Duration::days(due_in_days);
    card
}

fn fronts(cards: &[Flashcard]) -> Vec<&str> {
    let mut out: Vec<&str> = cards.iter().map(|c| c.front.as_str()).collect();
    out.sort_unstable();
    out
}

// =============================================================================
// construction
// =============================================================================

#[test]
fn new_card_trims_and_starts_due() {
    let deck = Uuid::new_v4();
    let card = Flashcard::new(deck, "  What is SM-2?  ", "\tA scheduler\n", now()).unwrap();
    assert_eq!(card.front, "What is SM-2?");
    assert_eq!(card.back, "A scheduler");
    assert_eq!(card.deck_id, deck);
    assert_eq!(card.review, ReviewState::new(now()));
    assert!(card.is_due(now()));
}

#[test]
fn new_card_rejects_blank_sides() {
    let deck = Uuid::new_v4();
    assert_eq!(Flashcard::new(deck, "   ", "b", now()), Err(SrsError::EmptyField { field: "front" }));
    assert_eq!(Flashcard::new(deck, "f", "", now()), Err(SrsError::EmptyField { field: "back" }));
}

#[test]
fn new_deck_trims_and_rejects_blank() {
    assert_eq!(Deck::new(" Biology ").unwrap().name, "Biology");
    assert_eq!(Deck::new(" "), Err(SrsError::EmptyField { field: "deck name" }));
}

#[test]
fn review_applies_scheduler_in_place() {
    let mut card = card(Uuid::new_v4(), "f", 0);
    let state = *card.review(Quality::new(5).unwrap(), now());
    assert_eq!(state.repetitions, 1);
    assert_eq!(state.interval, 1);
    assert_eq!(card.review, state);
    assert!(!card.is_due(now()));
}

#[test]
fn card_json_uses_flat_row_layout() {
    let card = card(Uuid::nil(), "front", 0);
    let json = serde_json::to_value(&card).unwrap();
    assert_eq!(json["easiness"], 2.5);
    assert_eq!(json["interval"], 0);
    assert_eq!(json["repetitions"], 0);
    assert_eq!(json["next_review"], "2023-11-14T22:13:20Z");

    let back: Flashcard = serde_json::from_value(json).unwrap();
    assert_eq!(back, card);
}

// =============================================================================
// due / stats
// =============================================================================

#[test]
fn due_cards_include_exactly_now() {
    let deck = Uuid::new_v4();
    let cards = vec![card(deck, "past", -2), card(deck, "now", 0), card(deck, "future", 3)];
    let due: Vec<&str> = due_cards(&cards, now()).iter().map(|c| c.front.as_str()).collect();
    assert_eq!(due, vec!["past", "now"]);
}

#[test]
fn deck_stats_count_only_that_deck() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let cards = vec![card(a, "a1", 0), card(a, "a2", 5), card(b, "b1", -1)];
    assert_eq!(deck_stats(&cards, a, now()), DeckStats { total: 2, due: 1 });
    assert_eq!(deck_stats(&cards, b, now()), DeckStats { total: 1, due: 1 });
    assert_eq!(deck_stats(&cards, Uuid::new_v4(), now()), DeckStats::default());
}

// =============================================================================
// study queue
// =============================================================================

#[test]
fn queue_prefers_due_cards() {
    let deck = Uuid::new_v4();
    let cards = vec![card(deck, "due-1", -1), card(deck, "later", 4), card(deck, "due-2", 0)];
    let mut rng = StdRng::seed_from_u64(7);
    let queue = build_study_queue(&cards, None, now(), &mut rng);
    assert_eq!(fronts(&queue), vec!["due-1", "due-2"]);
}

#[test]
fn queue_falls_back_to_whole_scope_when_nothing_due() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let cards = vec![card(a, "a1", 2), card(a, "a2", 9), card(b, "b1", -1)];
    let mut rng = StdRng::seed_from_u64(7);
    let queue = build_study_queue(&cards, Some(a), now(), &mut rng);
    assert_eq!(fronts(&queue), vec!["a1", "a2"]);
}

#[test]
fn queue_for_unknown_deck_is_empty() {
    let cards = vec![card(Uuid::new_v4(), "x", 0)];
    let mut rng = StdRng::seed_from_u64(1);
    assert!(build_study_queue(&cards, Some(Uuid::new_v4()), now(), &mut rng).is_empty());
}

#[test]
fn queue_order_depends_on_rng() {
    let deck = Uuid::new_v4();
    let cards: Vec<Flashcard> = (0..12).map(|i| card(deck, &format!("c{i:02}"), 0)).collect();
    let orders: Vec<Vec<Uuid>> = (0..4)
        .map(|seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            build_study_queue(&cards, None, now(), &mut rng).iter().map(|c| c.id).collect()
        })
        .collect();
    assert!(orders.windows(2).any(|pair| pair[0] != pair[1]));
}

#[test]
fn remove_deck_cards_drops_only_that_deck() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let mut cards = vec![card(a, "a1", 0), card(b, "b1", 0), card(a, "a2", 0)];
    assert_eq!(remove_deck_cards(&mut cards, a), 2);
    assert_eq!(fronts(&cards), vec!["b1"]);
}
