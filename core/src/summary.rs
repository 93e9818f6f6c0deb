//! End-of-session summary: five trait axes and a player archetype.

use vibe_types::{Message, VibeScore};

/// Trait axes, each in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraitAxes {
    pub empathy: u8,
    pub logic: u8,
    pub action: u8,
    pub humor: u8,
    pub patience: u8,
}

impl TraitAxes {
    const NEUTRAL: u8 = 50;

    /// Axes from the average rating of the scored messages and the final vibe.
    ///
    /// With no rated message every axis sits at 50.
    #[must_use]
    pub fn from_ratings(average: Option<f64>, vibe: VibeScore) -> Self {
        let Some(avg) = average else {
            return Self {
                empathy: Self::NEUTRAL,
                logic: Self::NEUTRAL,
                action: Self::NEUTRAL,
                humor: Self::NEUTRAL,
                patience: Self::NEUTRAL,
            };
        };
        let vibe = f64::from(vibe.value());
        Self {
            empathy: axis(avg * 20.0 + 10.0),
            logic: axis(110.0 - avg * 15.0),
            action: axis(avg * 10.0 + vibe * 0.5),
            humor: axis(avg * 6.0 + vibe * 0.6),
            patience: axis(vibe),
        }
    }

    #[must_use]
    pub fn as_array(&self) -> [(&'static str, u8); 5] {
        [
            ("empathy", self.empathy),
            ("logic", self.logic),
            ("action", self.action),
            ("humor", self.humor),
            ("patience", self.patience),
        ]
    }
}

fn axis(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Archetype {
    LightningRod,
    HealingGuardian,
    SoulTugger,
    SteelCalculator,
    QuietWatcher,
}

/// Display text for an archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchetypeProfile {
    pub emoji: &'static str,
    pub name: &'static str,
    pub traits: &'static str,
    pub description: &'static str,
    pub advice: &'static str,
}

impl Archetype {
    /// First matching rule wins; [`Archetype::QuietWatcher`] catches the rest.
    #[must_use]
    pub fn classify(axes: &TraitAxes) -> Self {
        if axes.empathy >= 95 && axes.patience >= 80 {
            Self::LightningRod
        } else if axes.empathy >= 75 && axes.action >= 70 {
            Self::HealingGuardian
        } else if axes.humor >= 60 && axes.action >= 60 {
            Self::SoulTugger
        } else if axes.logic >= 70 && axes.empathy < 60 {
            Self::SteelCalculator
        } else {
            Self::QuietWatcher
        }
    }

    #[must_use]
    pub const fn profile(self) -> ArchetypeProfile {
        match self {
            Archetype::HealingGuardian => ArchetypeProfile {
                emoji: "🏥",
                name: "療癒系暖護",
                traits: "高感性、高行動",
                description: "你是那種能瞬間接住對方情緒的人。你的優點是讓人感到無比安全，缺點是偶爾會忽略自己的需求。",
                advice: "保持溫柔的同時，也可以試著分享自己的脆弱。",
            },
            Archetype::SteelCalculator => ArchetypeProfile {
                emoji: "🤖",
                name: "鋼鐵運算者",
                traits: "高邏輯、低感性",
                description: "你的對話像是一台精密機器，只生產解決方案。優點是可靠，缺點是冷冰冰。",
                advice: "在給出建議前，先試著重複一次對方的情緒。",
            },
            Archetype::SoulTugger => ArchetypeProfile {
                emoji: "🎭",
                name: "靈魂拉扯家",
                traits: "高幽默、高能量",
                description: "你讓對話充滿驚喜與張力。優點是極具吸引力，缺點是讓人覺得不夠穩重。",
                advice: "在關鍵時刻展現認真的一面，會讓你更有魅力。",
            },
            Archetype::QuietWatcher => ArchetypeProfile {
                emoji: "🕯️",
                name: "靜謐守望者",
                traits: "高耐心、穩重型",
                description: "你是一個完美的聽眾。優點是情緒穩定，缺點是反應有時過於平淡。",
                advice: "偶爾主動拋出話題，會讓對方感受到你的參與感。",
            },
            Archetype::LightningRod => ArchetypeProfile {
                emoji: "🛡️",
                name: "情緒避雷針",
                traits: "極高共感力",
                description: "你天生就能避開對方的地雷。優點是互動流暢，缺點是顯得有些過於卑微。",
                advice: "適度的自信與主見會讓你更有吸引力。",
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSummary {
    /// Messages with a genuine rating. Degraded replies are not counted.
    pub rated_messages: usize,
    pub average_score: Option<f64>,
    pub axes: TraitAxes,
    pub archetype: Archetype,
}

impl SessionSummary {
    #[must_use]
    pub fn compute(messages: &[Message], vibe: VibeScore) -> Self {
        let ratings: Vec<u8> = messages
            .iter()
            .filter(|m| m.is_user())
            .filter_map(|m| m.feedback()?.score.rating())
            .map(|rating| rating.value())
            .collect();
        let average_score = if ratings.is_empty() {
            None
        } else {
            let total: u32 = ratings.iter().copied().map(u32::from).sum();
            Some(f64::from(total) / ratings.len() as f64)
        };
        let axes = TraitAxes::from_ratings(average_score, vibe);
        Self {
            rated_messages: ratings.len(),
            average_score,
            axes,
            archetype: Archetype::classify(&axes),
        }
    }
}
