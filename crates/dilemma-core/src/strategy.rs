//! Rule-based strategy definitions and execution

use std::fmt;

use serde::{Deserialize, Serialize};
use crate::random::SeededRng;

/// A move in the Prisoner's Dilemma
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Move {
    #[serde(rename = "C")]
    Cooperate,
    #[serde(rename = "D")]
    Defect,
}

impl Move {
    pub fn flip(self) -> Self {
        match self {
            Move::Cooperate => Move::Defect,
            Move::Defect => Move::Cooperate,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Move::Cooperate => 'C',
            Move::Defect => 'D',
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Base strategy type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyBase {
    /// Copy opponent's last move. Start with cooperate.
    TitForTat,
    /// Always defect, never cooperate.
    AlwaysDefect,
    /// Always cooperate, never defect.
    AlwaysCooperate,
    /// Cooperate until opponent defects, then always defect.
    GrimTrigger,
    /// Win-stay, lose-switch.
    Pavlov,
    /// Tit-for-Tat but start with defect.
    SuspiciousTitForTat,
    /// Random choice each round.
    Random,
    /// Defect only if opponent defected twice in a row.
    TitForTwoTats,
    /// Retaliate with increasing defection streaks, then forgive.
    Gradual,
    /// Tit-for-Tat that sneaks in occasional defections.
    Joss,
}

/// Strategy parameters for fine-tuning behavior
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyParams {
    /// Percentage chance to cooperate after opponent defects (0-100)
    pub forgiveness: u8,
    /// Number of defections to ignore before retaliating (0-5)
    pub noise_tolerance: u8,
    /// Bias toward cooperation for Random strategy (0-100)
    pub cooperate_bias: u8,
    /// Percentage chance for Joss to defect where it would cooperate (0-100)
    pub defect_chance: u8,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            forgiveness: 10,
            noise_tolerance: 0,
            cooperate_bias: 50,
            defect_chance: 10,
        }
    }
}

/// Complete strategy with base type and parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    pub base: StrategyBase,
    pub params: StrategyParams,
}

impl Strategy {
    /// Create a new strategy with default parameters
    pub fn new(base: StrategyBase) -> Self {
        Self {
            base,
            params: StrategyParams::default(),
        }
    }

    /// Create with custom parameters
    pub fn with_params(base: StrategyBase, params: StrategyParams) -> Self {
        Self { base, params }
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Self::new(StrategyBase::TitForTat)
    }
}

/// Execute a strategy for one round
///
/// # Arguments
/// * `strategy` - The strategy to execute
/// * `opponent_history` - Opponent's past realized moves
/// * `my_history` - Our past realized moves
/// * `rng` - Random number generator for this round
pub fn execute_strategy(
    strategy: &Strategy,
    opponent_history: &[Move],
    my_history: &[Move],
    rng: &mut SeededRng,
) -> Move {
    match strategy.base {
        StrategyBase::TitForTat => {
            execute_tit_for_tat(opponent_history, &strategy.params, rng)
        }
        StrategyBase::AlwaysDefect => Move::Defect,
        StrategyBase::AlwaysCooperate => Move::Cooperate,
        StrategyBase::GrimTrigger => {
            execute_grim_trigger(opponent_history, &strategy.params)
        }
        StrategyBase::Pavlov => {
            execute_pavlov(opponent_history, my_history)
        }
        StrategyBase::SuspiciousTitForTat => {
            if opponent_history.is_empty() {
                Move::Defect
            } else {
                execute_tit_for_tat(opponent_history, &strategy.params, rng)
            }
        }
        StrategyBase::Random => {
            execute_random(&strategy.params, rng)
        }
        StrategyBase::TitForTwoTats => {
            execute_tit_for_two_tats(opponent_history)
        }
        StrategyBase::Gradual => {
            execute_gradual(opponent_history, my_history)
        }
        StrategyBase::Joss => {
            execute_joss(opponent_history, &strategy.params, rng)
        }
    }
}

/// Tit-for-Tat: Copy opponent's last move, start with cooperate
fn execute_tit_for_tat(
    opponent_history: &[Move],
    params: &StrategyParams,
    rng: &mut SeededRng,
) -> Move {
    match opponent_history.last() {
        None | Some(Move::Cooperate) => Move::Cooperate,
        Some(Move::Defect) => {
            if params.forgiveness > 0 && rng.next_percent() < params.forgiveness {
                Move::Cooperate
            } else {
                Move::Defect
            }
        }
    }
}

/// Grim Trigger: Cooperate until opponent defects, then always defect
fn execute_grim_trigger(
    opponent_history: &[Move],
    params: &StrategyParams,
) -> Move {
    let defection_count = opponent_history
        .iter()
        .filter(|m| **m == Move::Defect)
        .count();

    if defection_count > params.noise_tolerance as usize {
        Move::Defect
    } else {
        Move::Cooperate
    }
}

/// Pavlov: repeat last move after the opponent cooperated, switch otherwise
fn execute_pavlov(
    opponent_history: &[Move],
    my_history: &[Move],
) -> Move {
    match (my_history.last(), opponent_history.last()) {
        (Some(mine), Some(Move::Cooperate)) => *mine,
        (Some(mine), Some(Move::Defect)) => mine.flip(),
        _ => Move::Cooperate,
    }
}

/// Random: Random choice with configurable bias
fn execute_random(
    params: &StrategyParams,
    rng: &mut SeededRng,
) -> Move {
    if rng.next_percent() < params.cooperate_bias {
        Move::Cooperate
    } else {
        Move::Defect
    }
}

/// Tit-for-Two-Tats: Only defect if opponent defected twice in a row
fn execute_tit_for_two_tats(
    opponent_history: &[Move],
) -> Move {
    if opponent_history.len() < 2 {
        return Move::Cooperate;
    }

    let last_two = &opponent_history[opponent_history.len() - 2..];
    if last_two[0] == Move::Defect && last_two[1] == Move::Defect {
        Move::Defect
    } else {
        Move::Cooperate
    }
}

/// Gradual: Escalating retaliation
/// After N opponent defections, player should have made N(N+1)/2 total defections
fn execute_gradual(
    opponent_history: &[Move],
    my_history: &[Move],
) -> Move {
    let their_defections = opponent_history
        .iter()
        .filter(|m| **m == Move::Defect)
        .count();
    let my_defections = my_history
        .iter()
        .filter(|m| **m == Move::Defect)
        .count();

    let expected = their_defections * (their_defections + 1) / 2;

    if my_defections < expected {
        Move::Defect
    } else {
        Move::Cooperate
    }
}

/// Joss: copy the opponent, but turn some cooperations into defections
fn execute_joss(
    opponent_history: &[Move],
    params: &StrategyParams,
    rng: &mut SeededRng,
) -> Move {
    match opponent_history.last() {
        None => Move::Cooperate,
        Some(Move::Defect) => Move::Defect,
        Some(Move::Cooperate) => {
            if rng.next_percent() < params.defect_chance {
                Move::Defect
            } else {
                Move::Cooperate
            }
        }
    }
}

/// Get a human-readable description of a strategy
pub fn describe_strategy(strategy: &Strategy) -> String {
    let base_desc = match strategy.base {
        StrategyBase::TitForTat => "Copies opponent's last move. Starts by cooperating.",
        StrategyBase::AlwaysDefect => "Never cooperates. Always defects.",
        StrategyBase::AlwaysCooperate => "Never defects. Always cooperates.",
        StrategyBase::GrimTrigger => "Cooperates until betrayed, then always defects.",
        StrategyBase::Pavlov => "Repeats its move after cooperation, switches after defection.",
        StrategyBase::SuspiciousTitForTat => "Like Tit-for-Tat, but starts with defect.",
        StrategyBase::Random => "Randomly cooperates or defects each round.",
        StrategyBase::TitForTwoTats => "Only retaliates after two consecutive defections.",
        StrategyBase::Gradual => "Retaliates with increasing severity, then forgives.",
        StrategyBase::Joss => "Tit-for-Tat that occasionally defects unprovoked.",
    };

    let mut desc = base_desc.to_string();

    let forgives = matches!(
        strategy.base,
        StrategyBase::TitForTat | StrategyBase::SuspiciousTitForTat
    );
    if forgives && strategy.params.forgiveness > 0 {
        desc.push_str(&format!(" {}% chance to forgive.", strategy.params.forgiveness));
    }

    if strategy.base == StrategyBase::GrimTrigger && strategy.params.noise_tolerance > 0 {
        desc.push_str(&format!(" Tolerates {} accidental defections.", strategy.params.noise_tolerance));
    }

    desc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::Move::{Cooperate as C, Defect as D};

    fn make_rng() -> SeededRng {
        SeededRng::new(42, 0)
    }

    fn strict(base: StrategyBase) -> Strategy {
        Strategy::with_params(base, StrategyParams { forgiveness: 0, ..Default::default() })
    }

    #[test]
    fn test_tit_for_tat_first_move() {
        let strategy = strict(StrategyBase::TitForTat);
        let mut rng = make_rng();

        assert_eq!(execute_strategy(&strategy, &[], &[], &mut rng), C);
    }

    #[test]
    fn test_tit_for_tat_copies() {
        let strategy = strict(StrategyBase::TitForTat);
        let mut rng = make_rng();

        assert_eq!(execute_strategy(&strategy, &[C], &[C], &mut rng), C);
        assert_eq!(execute_strategy(&strategy, &[D], &[C], &mut rng), D);
    }

    #[test]
    fn test_always_defect_and_cooperate() {
        let mut rng = make_rng();
        let ad = Strategy::new(StrategyBase::AlwaysDefect);
        let ac = Strategy::new(StrategyBase::AlwaysCooperate);

        for _ in 0..10 {
            assert_eq!(execute_strategy(&ad, &[C, C], &[D, D], &mut rng), D);
            assert_eq!(execute_strategy(&ac, &[D, D], &[C, C], &mut rng), C);
        }
    }

    #[test]
    fn test_grim_trigger() {
        let strategy = Strategy::new(StrategyBase::GrimTrigger);
        let mut rng = make_rng();

        assert_eq!(execute_strategy(&strategy, &[C, C], &[C, C], &mut rng), C);
        assert_eq!(execute_strategy(&strategy, &[C, D], &[C, C], &mut rng), D);
        // no forgiveness once triggered
        assert_eq!(execute_strategy(&strategy, &[D, C, C, C], &[C, D, D, D], &mut rng), D);
    }

    #[test]
    fn test_grim_trigger_noise_tolerance() {
        let strategy = Strategy::with_params(
            StrategyBase::GrimTrigger,
            StrategyParams { noise_tolerance: 1, ..Default::default() },
        );
        let mut rng = make_rng();

        assert_eq!(execute_strategy(&strategy, &[D], &[C], &mut rng), C);
        assert_eq!(execute_strategy(&strategy, &[D, D], &[C, C], &mut rng), D);
    }

    #[test]
    fn test_pavlov() {
        let strategy = Strategy::new(StrategyBase::Pavlov);
        let mut rng = make_rng();

        assert_eq!(execute_strategy(&strategy, &[], &[], &mut rng), C);
        // win-stay
        assert_eq!(execute_strategy(&strategy, &[C], &[C], &mut rng), C);
        assert_eq!(execute_strategy(&strategy, &[C], &[D], &mut rng), D);
        // lose-switch
        assert_eq!(execute_strategy(&strategy, &[D], &[C], &mut rng), D);
        assert_eq!(execute_strategy(&strategy, &[D], &[D], &mut rng), C);
    }

    #[test]
    fn test_suspicious_tft_starts_defect() {
        let strategy = strict(StrategyBase::SuspiciousTitForTat);
        let mut rng = make_rng();

        assert_eq!(execute_strategy(&strategy, &[], &[], &mut rng), D);
        assert_eq!(execute_strategy(&strategy, &[C], &[D], &mut rng), C);
    }

    #[test]
    fn test_tit_for_two_tats() {
        let strategy = Strategy::new(StrategyBase::TitForTwoTats);
        let mut rng = make_rng();

        assert_eq!(execute_strategy(&strategy, &[C, D], &[C, C], &mut rng), C);
        assert_eq!(execute_strategy(&strategy, &[D, D], &[C, C], &mut rng), D);
    }

    #[test]
    fn test_tit_for_two_tats_opens_cooperatively() {
        let strategy = Strategy::new(StrategyBase::TitForTwoTats);
        let mut rng = make_rng();

        assert_eq!(execute_strategy(&strategy, &[], &[], &mut rng), C);
        assert_eq!(execute_strategy(&strategy, &[D], &[C], &mut rng), C);
    }

    #[test]
    fn test_gradual_escalates() {
        let strategy = Strategy::new(StrategyBase::Gradual);
        let mut rng = make_rng();

        // one opponent defection -> one retaliation owed
        assert_eq!(execute_strategy(&strategy, &[D], &[C], &mut rng), D);
        assert_eq!(execute_strategy(&strategy, &[D, C], &[C, D], &mut rng), C);
        // two opponent defections -> three retaliations owed
        assert_eq!(execute_strategy(&strategy, &[D, C, D], &[C, D, C], &mut rng), D);
    }

    #[test]
    fn test_joss_never_cooperates_after_defection() {
        let strategy = Strategy::with_params(
            StrategyBase::Joss,
            StrategyParams { defect_chance: 0, ..Default::default() },
        );
        let mut rng = make_rng();
        assert_eq!(execute_strategy(&strategy, &[], &[], &mut rng), C);
        assert_eq!(execute_strategy(&strategy, &[C], &[C], &mut rng), C);
        assert_eq!(execute_strategy(&strategy, &[D], &[C], &mut rng), D);
    }

    #[test]
    fn test_joss_sneaky_defections() {
        let strategy = Strategy::with_params(
            StrategyBase::Joss,
            StrategyParams { defect_chance: 100, ..Default::default() },
        );
        let mut rng = make_rng();
        assert_eq!(execute_strategy(&strategy, &[C], &[C], &mut rng), D);
    }

    #[test]
    fn test_cooperate_bias_extremes() {
        let never = Strategy::with_params(
            StrategyBase::Random,
            StrategyParams { cooperate_bias: 0, ..Default::default() },
        );
        let always = Strategy::with_params(
            StrategyBase::Random,
            StrategyParams { cooperate_bias: 100, ..Default::default() },
        );
        let mut rng = make_rng();
        for _ in 0..20 {
            assert_eq!(execute_strategy(&never, &[], &[], &mut rng), D);
            assert_eq!(execute_strategy(&always, &[], &[], &mut rng), C);
        }
    }

    #[test]
    fn test_forgiveness_statistical() {
        let strategy = Strategy::with_params(
            StrategyBase::TitForTat,
            StrategyParams { forgiveness: 100, ..Default::default() },
        );
        let mut rng = make_rng();

        for _ in 0..20 {
            assert_eq!(execute_strategy(&strategy, &[D], &[C], &mut rng), C);
        }
    }

    #[test]
    fn test_move_serde_uses_letters() {
        assert_eq!(serde_json::to_string(&C).unwrap(), "\"C\"");
        assert_eq!(serde_json::from_str::<Move>("\"D\"").unwrap(), D);
        assert_eq!(C.flip(), D);
        assert_eq!(D.to_string(), "D");
    }

    #[test]
    fn test_describe_mentions_parameters() {
        let tft = Strategy::new(StrategyBase::TitForTat);
        assert!(describe_strategy(&tft).contains("10% chance to forgive"));

        let grim = Strategy::with_params(
            StrategyBase::GrimTrigger,
            StrategyParams { noise_tolerance: 2, ..Default::default() },
        );
        assert!(describe_strategy(&grim).contains("Tolerates 2"));
    }
}
