//! Word-level Markov chain used to write the "wisdom" found in the maze.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;

pub const DEFAULT_ORDER: usize = 2;
pub const DEFAULT_MAX_TOKENS: usize = 24;

/// Short prose passages the chain learns from, one per line.
pub const CORPUS: &str = "\
To find a piece of deep violet or grape-coloured material that has been pressed between the pages of a notebook.
Long flowering branches of beautifully coloured wisteria entwined about a pine tree.
upon a dun-coloured horse coming towards them.
So they finished the game and began another; and as they were finishing that game, lo, they heard a great tumult and a clamour of armed men, and a croaking of Ravens.
water becomes crystalline stone under the mountain wind where the great cold is, and the air always turns into the cold element there, so that water is queen there, because of the cold.
And it was as if gold covered their bodies and melted the crystals.
I remember one occasion when I visited the Palace to see the procession of blue horses.
red satin wrought with yellow silk, and yellow were the borders of their scarf.
Then, behold, they brought bowls of silver wherein was water to wash, and towels of linen, some green and some white; and I washed.
and traversed the valley till they reached the green tree, where they saw the fountain, and the bowl, and the slab.
Last year's paper fan. A night with a clear moon.
Opening the door, that I might be, of that green branched garden free.
Those birds, ne'er a note fell wrong, for they were skilful thus, and wise; hearing those creatures of the skies, seeing the green leaves all around.
";

const TITLES: &[&str] = &[
    "A pressed leaf",
    "Carved in the wall",
    "A whisper",
    "Found underfoot",
    "Scratched in stone",
];

#[derive(Clone, Debug, Default)]
pub struct MarkovChain {
    order: usize,
    max_tokens: usize,
    ngrams: HashMap<String, Vec<String>>,
    beginnings: Vec<String>,
}

impl MarkovChain {
    pub fn new(order: usize, max_tokens: usize) -> Self {
        Self {
            order: order.max(1),
            max_tokens,
            ngrams: HashMap::new(),
            beginnings: Vec::new(),
        }
    }

    pub fn with_corpus() -> Self {
        let mut chain = Self::new(DEFAULT_ORDER, DEFAULT_MAX_TOKENS);
        for line in CORPUS.lines() {
            chain.feed(line);
        }
        chain
    }

    /// Learns one line. Lines shorter than the chain order are skipped and
    /// reported as `false`.
    pub fn feed(&mut self, text: &str) -> bool {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() < self.order {
            return false;
        }
        self.beginnings.push(tokens[..self.order].join(" "));
        for window in tokens.windows(self.order + 1) {
            let gram = window[..self.order].join(" ");
            self.ngrams
                .entry(gram)
                .or_default()
                .push(window[self.order].to_string());
        }
        true
    }

    pub fn is_empty(&self) -> bool {
        self.beginnings.is_empty()
    }

    /// Walks the chain from a random beginning until `max_tokens` extra
    /// tokens were added or the current n-gram has no successor.
    pub fn generate(&self, rng: &mut impl Rng) -> Option<String> {
        let start = self.beginnings.choose(rng)?;
        let mut output: Vec<&str> = start.split(' ').collect();
        for _ in 0..self.max_tokens {
            let current = output[output.len() - self.order..].join(" ");
            let Some(next) = self.ngrams.get(&current).and_then(|n| n.choose(rng)) else {
                break;
            };
            output.push(next.as_str());
        }
        Some(output.join(" "))
    }
}

pub fn random_title(rng: &mut impl Rng) -> String {
    TITLES.choose(rng).copied().unwrap_or("Wisdom").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn short_lines_are_skipped() {
        let mut chain = MarkovChain::new(3, 10);
        assert!(!chain.feed("too short"));
        assert!(chain.is_empty());
        assert!(chain.generate(&mut StdRng::seed_from_u64(1)).is_none());
    }

    #[test]
    fn single_line_reproduces_itself() {
        let mut chain = MarkovChain::new(2, 50);
        assert!(chain.feed("the quick brown fox jumps"));
        let text = chain.generate(&mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(text, "the quick brown fox jumps");
    }

    #[test]
    fn output_is_capped() {
        let mut chain = MarkovChain::new(1, 3);
        chain.feed("a a a a a a a a");
        let text = chain.generate(&mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(text.split(' ').count(), 4);
    }

    #[test]
    fn corpus_chain_generates_text() {
        let chain = MarkovChain::with_corpus();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..10 {
            let text = chain.generate(&mut rng).unwrap();
            assert!(text.split(' ').count() >= DEFAULT_ORDER);
        }
        assert!(!random_title(&mut rng).is_empty());
    }
}
