//! Player-versus-world contact
//!
//! Both passes are pure: they read the player and the live entities and
//! report what should happen. Applying the result (ending the run,
//! destroying a pickup, moving the player) is up to the caller.

use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityId, EntityKind};
use super::player::Player;
use super::state::TerminationReason;

/// Slack for "was above the platform" checks, absorbs float drift
const CONTACT_EPSILON: f32 = 0.01;

/// Result of the hazard/pickup pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Continue,
    Terminate(TerminationReason),
    Collect(EntityId),
}

impl Outcome {
    /// Lower wins when several contacts happen in one tick
    fn priority(&self) -> u8 {
        match self {
            Outcome::Terminate(TerminationReason::Incinerated) => 0,
            Outcome::Terminate(TerminationReason::Crashed) => 1,
            Outcome::Terminate(_) => 2,
            Outcome::Collect(_) => 3,
            Outcome::Continue => 4,
        }
    }
}

/// Result of the support pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Support {
    /// Came down onto a surface whose top edge is at `top`
    Land { top: f32 },
    /// Hit the underside of solid ground whose bottom edge is at `bottom`
    Ceiling { bottom: f32 },
}

fn outcome_for(entity: &Entity) -> Outcome {
    match entity.kind {
        EntityKind::PursuitHazard => Outcome::Terminate(TerminationReason::Incinerated),
        EntityKind::StaticObstacle | EntityKind::OscillatingObstacle => {
            Outcome::Terminate(TerminationReason::Crashed)
        }
        EntityKind::PatrollingHazard => Outcome::Terminate(TerminationReason::Impaled),
        EntityKind::Pickup => Outcome::Collect(entity.id),
        EntityKind::Ground | EntityKind::ElevatedPlatform => Outcome::Continue,
    }
}

/// Check the player against every entity and report the single most
/// important outcome: laser, then obstacles, then patrolling hazards, then
/// pickups. Among equal outcomes the first entity visited wins.
pub fn resolve<'a, I>(player: &Player, entities: I) -> Outcome
where
    I: IntoIterator<Item = &'a Entity>,
{
    let hitbox = player.hitbox();
    let mut best = Outcome::Continue;

    for entity in entities {
        if entity.destroyed || !hitbox.overlaps(&entity.bbox) {
            continue;
        }
        let outcome = outcome_for(entity);
        if outcome.priority() < best.priority() {
            best = outcome;
            if best.priority() == 0 {
                break;
            }
        }
    }

    best
}

/// Find what the player should stand on (or bump into) this tick.
///
/// Platforms are one-way: they only catch a player that is falling and whose
/// lower edge was at or above the platform top before this tick's move.
/// Ground is solid from both sides.
pub fn resolve_support<'a, I>(player: &Player, entities: I) -> Option<Support>
where
    I: IntoIterator<Item = &'a Entity>,
{
    let now = player.hitbox();
    let before = player.previous_hitbox();
    let falling = player.vel.y > 0.0;
    let rising = player.vel.y < 0.0;

    let mut landing: Option<f32> = None;
    let mut ceiling: Option<f32> = None;

    for entity in entities {
        if entity.destroyed || !entity.kind.is_support() {
            continue;
        }
        let surface = entity.bbox;
        let alongside = now.left() < surface.right() && now.right() > surface.left();
        if !alongside {
            continue;
        }
        // Swept: the top edge was crossed at some point during the step
        if falling
            && before.bottom() <= surface.top() + CONTACT_EPSILON
            && now.bottom() >= surface.top()
        {
            landing = Some(landing.map_or(surface.top(), |t| t.min(surface.top())));
        } else if rising
            && now.overlaps(&surface)
            && entity.kind == EntityKind::Ground
            && before.top() >= surface.bottom() - CONTACT_EPSILON
        {
            ceiling = Some(ceiling.map_or(surface.bottom(), |b| b.max(surface.bottom())));
        }
    }

    landing
        .map(|top| Support::Land { top })
        .or(ceiling.map(|bottom| Support::Ceiling { bottom }))
}
