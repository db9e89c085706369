//! Chat banter between racers

use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::VecDeque;
use std::time::Duration;
use walkrace_api::ChatLine;
use walkrace_config::ChatConfig;
use walkrace_util::{CooldownTracker, MonotonicInstant, PlayerId};

const GREETINGS: &[&str] = &[
    "Let's go! 🚀",
    "Ready to walk! 💪",
    "Here we go! 🎯",
    "Time to move! 🏃",
    "Let's do this! 🔥",
];

const ENCOURAGEMENTS: &[&str] = &[
    "You got this! 💪",
    "Keep it up! 👏",
    "Looking good! ✨",
    "Nice pace! 🏃",
    "Awesome! 🌟",
    "Great job! 👍",
    "You're crushing it! 💥",
];

const TAUNTS: &[&str] = &[
    "Catch me if you can! 😂",
    "Too slow! 🐌",
    "Is that all you got? 😆",
    "I'm way ahead! 🤣",
    "Eat my dust! 💨",
    "See ya at the finish! 👋",
    "Better hurry up! ⏰",
];

const REACTIONS: &[&str] = &[
    "Whoa! 😮",
    "No way! 😱",
    "Haha! 😂",
    "OMG! 🤯",
    "Seriously?! 😲",
    "LOL! 🤣",
    "Nice one! 😄",
];

const CELEBRATIONS: &[&str] = &[
    "Yes! I did it! 🎉",
    "Victory is mine! 🏆",
    "Champion! 👑",
    "First place baby! 🥇",
    "I'm the best! 🌟",
    "Unbeatable! 💪",
    "Winner winner! 🎊",
];

const FRUSTRATIONS: &[&str] = &[
    "Oh come on! 😤",
    "Not fair! 😠",
    "Ugh! 😫",
    "This is hard! 😰",
    "I can't keep up! 😩",
    "Wait for me! 😭",
];

const BANTER: &[&str] = &[
    "This is fun! 😊",
    "My legs are burning! 🔥",
    "Almost there! 🏁",
    "Don't give up! 💯",
    "Push harder! 💪",
    "I love this game! ❤️",
    "Who's winning? 🤔",
    "Keep walking! 👣",
];

const COMEBACKS: &[&str] = &[
    "Haha nice one! 😂",
    "You wish! 😏",
    "Dream on! 💭",
    "That's what you think! 🤔",
    "We'll see about that! 😤",
    "Challenge accepted! 💪",
    "Bring it on! 🔥",
    "LOL good luck! 🤣",
];

const EMOJIS: &[&str] = &[
    "😂", "🤣", "😆", "😎", "🔥", "💪", "✨", "🎯", "🚀", "💯", "👏", "🌟",
];

/// Message pools a player draws from at a given point in the race
pub fn pools_for(game_progress: f64, rank: usize, total_players: usize) -> Vec<&'static [&'static str]> {
    if game_progress < 0.1 {
        vec![GREETINGS]
    } else if game_progress > 0.9 {
        if rank == 1 {
            vec![CELEBRATIONS, TAUNTS]
        } else {
            vec![FRUSTRATIONS, ENCOURAGEMENTS]
        }
    } else if rank == 1 {
        vec![TAUNTS, BANTER, REACTIONS]
    } else if rank == total_players {
        vec![FRUSTRATIONS, ENCOURAGEMENTS, BANTER]
    } else {
        vec![BANTER, ENCOURAGEMENTS, REACTIONS]
    }
}

/// Produces throttled, context-dependent chat lines
pub struct ChatGenerator<R> {
    rng: R,
    config: ChatConfig,
    cooldowns: CooldownTracker<PlayerId>,
    history: VecDeque<ChatLine>,
    next_seq: u64,
}

impl<R: Rng> ChatGenerator<R> {
    pub fn new(config: ChatConfig, rng: R) -> Self {
        Self {
            rng,
            config,
            cooldowns: CooldownTracker::new(),
            history: VecDeque::new(),
            next_seq: 1,
        }
    }

    /// Maybe produce a line for `player_id`.
    ///
    /// `rank` is 1-based among `total_players`. Returns `None` while the
    /// player's cooldown runs and, otherwise, with the configured silence
    /// probability.
    pub fn generate(
        &mut self,
        player_id: &PlayerId,
        game_progress: f64,
        rank: usize,
        total_players: usize,
        now: MonotonicInstant,
    ) -> Option<ChatLine> {
        let window = self.cooldown_window();
        if !self.cooldowns.is_ready(player_id, now, window) {
            return None;
        }

        if self.rng.gen_bool(self.config.silence_probability) {
            return None;
        }

        let pools = pools_for(game_progress, rank, total_players);
        let pool: Vec<&str> = pools.iter().flat_map(|p| p.iter().copied()).collect();
        let mut message = pool.choose(&mut self.rng)?.to_string();

        if self.rng.gen_bool(self.config.emoji_probability) {
            if let Some(emoji) = EMOJIS.choose(&mut self.rng) {
                message.push(' ');
                message.push_str(emoji);
            }
        }

        let line = self.line(player_id, message);
        self.cooldowns.mark_fired(player_id, now);
        self.remember(line.clone());
        Some(line)
    }

    /// A comeback from `reacting` to something `original` said.
    ///
    /// Never reacts to oneself. Not throttled and not kept in history.
    pub fn generate_reaction_to(
        &mut self,
        original: &PlayerId,
        reacting: &PlayerId,
    ) -> Option<ChatLine> {
        if original == reacting {
            return None;
        }
        let message = COMEBACKS.choose(&mut self.rng)?.to_string();
        Some(self.line(reacting, message))
    }

    /// Most recent lines, oldest first
    pub fn history(&self) -> impl Iterator<Item = &ChatLine> {
        self.history.iter()
    }

    /// Forget cooldowns and history
    pub fn reset(&mut self) {
        self.cooldowns.clear();
        self.history.clear();
    }

    fn cooldown_window(&mut self) -> Duration {
        let (min, max) = (self.config.cooldown_min, self.config.cooldown_max);
        if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    fn line(&mut self, player_id: &PlayerId, message: String) -> ChatLine {
        let seq = self.next_seq;
        self.next_seq += 1;
        ChatLine {
            id: format!("{}-{}", player_id, seq),
            player_id: player_id.clone(),
            message,
        }
    }

    fn remember(&mut self, line: ChatLine) {
        self.history.push_back(line);
        while self.history.len() > self.config.history_limit {
            self.history.pop_front();
        }
    }
}
