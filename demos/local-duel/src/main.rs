//! Plays one 1v1 battle between two simulated players and prints the result.
//!
//! ```text
//! RUST_LOG=info cargo run -p local-duel [questions.json]
//! ```

use quizarena::prelude::*;
use rand::Rng;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Built-in questions
// ---------------------------------------------------------------------------

const BUILTIN_QUESTIONS: &str = r#"[
  {"statement": "Which planet is closest to the Sun?",
   "options": ["Venus", "Mercury", "Mars", "Earth"], "correct_answer": 1, "topic": "space"},
  {"statement": "How many sides does a hexagon have?",
   "options": ["5", "8", "6", "7"], "correct_answer": 2, "topic": "math"},
  {"statement": "What is the chemical symbol for gold?",
   "options": ["Au", "Ag", "Gd", "Go"], "correct_answer": 0, "topic": "chemistry"},
  {"statement": "Which ocean is the largest?",
   "options": ["Atlantic", "Indian", "Arctic", "Pacific"], "correct_answer": 3, "topic": "geography"},
  {"statement": "What is 7 x 8?",
   "options": ["54", "56", "64", "58"], "correct_answer": 1, "topic": "math"}
]"#;

async fn load_bank() -> Result<QuestionBank, Box<dyn std::error::Error>> {
    let bank = match std::env::args().nth(1) {
        Some(path) => QuestionBank::from_json(&tokio::fs::read(&path).await?)?,
        None => QuestionBank::from_json(BUILTIN_QUESTIONS.as_bytes())?,
    };
    Ok(bank)
}

// ---------------------------------------------------------------------------
// Simulated players
// ---------------------------------------------------------------------------

/// How a bot plays: chance of a right answer and its answer time range.
struct Bot {
    profile: PlayerProfile,
    accuracy: f64,
    min_ms: u64,
    max_ms: u64,
}

impl Bot {
    fn answer<R: Rng + ?Sized>(&self, question: &Question, rng: &mut R) -> (usize, u64) {
        let selected = if rng.random_bool(self.accuracy) {
            question.correct_answer
        } else {
            (question.correct_answer + rng.random_range(1..4)) % 4
        };
        (selected, rng.random_range(self.min_ms..=self.max_ms))
    }
}

async fn play(engine: &BattleEngine<MemoryStore, QuestionBank>, bots: &[Bot]) -> Result<BattleRoom, ArenaError> {
    let settings = RoomSettings {
        questions_count: 5,
        ..RoomSettings::default()
    };
    let host = &bots[0].profile;
    let room = engine
        .create_room(host.id, BattleMode::OneVsOne, settings, true)
        .await?;
    let code = room.invite_code().unwrap_or_default().to_string();
    engine.join_room(room.id(), host.clone()).await?;
    for bot in &bots[1..] {
        engine.join_by_invite_code(&code, bot.profile.clone()).await?;
    }
    for bot in bots {
        engine.set_player_ready(room.id(), bot.profile.id).await?;
    }

    let mut room = engine.start_battle(room.id()).await?;
    let questions = room.questions().to_vec();
    for (index, question) in questions.iter().enumerate() {
        for bot in bots {
            let (selected, spent) = bot.answer(question, &mut rand::rng());
            room = engine
                .submit_answer(room.id(), bot.profile.id, index, selected, spent)
                .await?;
        }
    }
    Ok(room)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let bank = load_bank().await?;
    let engine = BattleEngine::new(MemoryStore::new(), bank);

    let mut updates = engine.subscribe();
    let watcher = tokio::spawn(async move {
        let mut seen = 0usize;
        while let Ok(update) = updates.recv().await {
            seen += 1;
            if update.event.is_terminal() {
                break;
            }
        }
        seen
    });

    let bots = [
        Bot {
            profile: PlayerProfile::new(PlayerId(1), "ada"),
            accuracy: 0.8,
            min_ms: 4_000,
            max_ms: 15_000,
        },
        Bot {
            profile: PlayerProfile::new(PlayerId(2), "grace"),
            accuracy: 0.6,
            min_ms: 2_000,
            max_ms: 10_000,
        },
    ];
    let room = play(&engine, &bots).await?;
    let events = watcher.await?;

    println!("room {} finished after {events} events", room.id());
    for (rank, player) in room.standings().iter().enumerate() {
        println!(
            "  #{} {:<8} {:>5} pts  {}/{} correct  {:.1}s",
            rank + 1,
            player.name,
            player.score,
            player.correct_count(),
            room.questions().len(),
            player.total_time_ms() as f64 / 1_000.0,
        );
    }
    match room.winner() {
        Some(BattleOutcome::Player { player_id, score }) => {
            println!("winner: {player_id} with {score} points");
        }
        Some(BattleOutcome::Draw { score }) => println!("draw at {score} points"),
        Some(other) => println!("outcome: {}", serde_json::to_string(other)?),
        None => println!("no winner"),
    }
    tracing::debug!(room = %serde_json::to_string(&room)?, "final room");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bots() -> [Bot; 2] {
        [
            Bot {
                profile: PlayerProfile::new(PlayerId(1), "a"),
                accuracy: 1.0,
                min_ms: 1_000,
                max_ms: 1_000,
            },
            Bot {
                profile: PlayerProfile::new(PlayerId(2), "b"),
                accuracy: 0.0,
                min_ms: 500,
                max_ms: 500,
            },
        ]
    }

    #[test]
    fn test_builtin_questions_parse() {
        let bank = QuestionBank::from_json(BUILTIN_QUESTIONS.as_bytes()).unwrap();
        assert_eq!(bank.len(), 5);
    }

    #[tokio::test]
    async fn test_play_accurate_bot_wins() {
        let bank = QuestionBank::from_json(BUILTIN_QUESTIONS.as_bytes()).unwrap();
        let engine = BattleEngine::new(MemoryStore::new(), bank);
        let room = play(&engine, &bots()).await.unwrap();

        assert_eq!(room.status(), RoomStatus::Finished);
        // 5 right answers at 1 s: 5 * (100 + 290).
        assert_eq!(
            room.winner(),
            Some(&BattleOutcome::Player { player_id: PlayerId(1), score: 1_950 })
        );
        assert_eq!(room.player(PlayerId(2)).unwrap().score, 0);
    }
}
