use colored::Color;

use crate::testing::Verdict;

pub trait SemanticColor {
    fn verdict(&self, verdict: Verdict) -> Color {
        use Verdict::*;
        match verdict {
            AC | GEN => self.success(),
            WA | ERR => self.error(),
            TLE | SKIP => self.muted(),
        }
    }

    fn error(&self) -> Color;
    fn success(&self) -> Color;
    fn muted(&self) -> Color;
    fn highlight(&self) -> Color;
    fn added(&self) -> Color;
    fn removed(&self) -> Color;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPalette;

impl SemanticColor for DefaultPalette {
    fn error(&self) -> Color {
        Color::Red
    }

    fn success(&self) -> Color {
        Color::Green
    }

    fn muted(&self) -> Color {
        Color::White
    }

    fn highlight(&self) -> Color {
        Color::Yellow
    }

    fn added(&self) -> Color {
        Color::Green
    }

    fn removed(&self) -> Color {
        Color::Red
    }
}
