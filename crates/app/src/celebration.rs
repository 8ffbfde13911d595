use rand::{seq::SliceRandom, Rng};
use workout_core::CompletionSummary;

const CONFETTI: &[char] = &['*', '+', 'o', '.', '~', '\'', '^'];
const WIDTH: usize = 40;
const ROWS: usize = 3;

/// Renders the completion banner with a scattering of confetti above and
/// below the message.
pub fn banner<R: Rng + ?Sized>(summary: &CompletionSummary, rng: &mut R) -> String {
    let message = format!(
        "Workout complete! {} exercises, {}",
        summary.exercises,
        format_clock(summary.total_seconds)
    );

    let mut lines = Vec::with_capacity(ROWS * 2 + 1);
    for _ in 0..ROWS {
        lines.push(confetti_row(rng));
    }
    lines.push(format!("{message:^WIDTH$}"));
    for _ in 0..ROWS {
        lines.push(confetti_row(rng));
    }
    lines.join("\n")
}

fn confetti_row<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..WIDTH)
        .map(|_| {
            if rng.gen_bool(0.3) {
                *CONFETTI.choose(&mut *rng).unwrap_or(&'*')
            } else {
                ' '
            }
        })
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// `m:ss` rendering used for countdowns and summaries.
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
