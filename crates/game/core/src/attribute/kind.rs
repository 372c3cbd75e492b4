use bitflags::bitflags;

/// Every attribute carried by a character's [`AttributeSet`](super::AttributeSet).
///
/// `Damage` is a meta attribute: it only exists as a transient accumulator
/// between an effect execution and the post-execute hook that converts it
/// into a Health loss.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[repr(u8)]
pub enum AttributeKind {
    Health,
    MaxHealth,
    Mana,
    MaxMana,
    AttackPower,
    DefensePower,
    MoveSpeed,
    Damage,
}

impl AttributeKind {
    pub const COUNT: usize = 8;

    pub const ALL: [AttributeKind; Self::COUNT] = [
        Self::Health,
        Self::MaxHealth,
        Self::Mana,
        Self::MaxMana,
        Self::AttackPower,
        Self::DefensePower,
        Self::MoveSpeed,
        Self::Damage,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Initial base value of a freshly created attribute set.
    pub const fn default_value(self) -> f32 {
        match self {
            Self::Health | Self::MaxHealth => 1.0,
            Self::Mana | Self::MaxMana => 0.0,
            Self::AttackPower | Self::DefensePower | Self::MoveSpeed => 1.0,
            Self::Damage => 0.0,
        }
    }

    /// The attribute capping this one, for capped attributes.
    pub const fn cap(self) -> Option<AttributeKind> {
        match self {
            Self::Health => Some(Self::MaxHealth),
            Self::Mana => Some(Self::MaxMana),
            _ => None,
        }
    }

    /// The attribute capped by this one, for max attributes.
    pub const fn capped(self) -> Option<AttributeKind> {
        match self {
            Self::MaxHealth => Some(Self::Health),
            Self::MaxMana => Some(Self::Mana),
            _ => None,
        }
    }

    pub const fn is_meta(self) -> bool {
        matches!(self, Self::Damage)
    }

    pub const fn field(self) -> AttributeFields {
        AttributeFields::from_bits_truncate(1 << self as u8)
    }
}

bitflags! {
    /// Tracks which attributes changed during an effect application.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct AttributeFields: u8 {
        const HEALTH        = 1 << 0;
        const MAX_HEALTH    = 1 << 1;
        const MANA          = 1 << 2;
        const MAX_MANA      = 1 << 3;
        const ATTACK_POWER  = 1 << 4;
        const DEFENSE_POWER = 1 << 5;
        const MOVE_SPEED    = 1 << 6;
        const DAMAGE        = 1 << 7;
    }
}
