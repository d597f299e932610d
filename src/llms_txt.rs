// LLM-friendly documentation endpoint content.

pub const LLMS_TXT: &str = r#"# LUKU AI Puzzle Backend
> An Arabic trivia and puzzle assistant. Chat is answered by a hosted language model; puzzles come from templates, the model, or a static backup list.

## Authentication
None.

## Key Endpoints
- POST /chat - Chat turn. Body: {"message", "sessionId"?, "category"?, "level"?, "userId"?}
- POST /puzzle - Generate a puzzle the user has not seen. Body: {"category"?, "level"?, "userId"?, "sessionId"?}
- POST /answer - Record an answer. Body: {"userId", "correct", "level"?}
- GET /categories - Template categories
- GET /characters - Selectable assistant personas
- GET /profile/{user_id} - Points, streak, achievements
- PUT /profile/{user_id}/character - Choose a persona. Body: {"character"}
- POST /profile/{user_id}/reset-history - Forget served puzzles
- GET /leaderboard?limit=N - Top users by points
- POST /sessions - Create a chat session
- GET/DELETE /sessions/{id} - Inspect or delete a session
- GET /test-gemini - Probe the model connection
- GET /health - Service status
- GET /metrics - Prometheus metrics

## Levels
سهل (easy), متوسط (medium), صعب (hard)

## Puzzle tiers
template -> external -> backup. A puzzle is always returned.
"#;
