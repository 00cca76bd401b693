/// Health is signed: damage is never floored, so callers detect death with
/// `health() <= 0`.
pub(crate) trait Combat {
    fn health(&self) -> i32;
    fn max_health(&self) -> i32;
    fn attack_power(&self) -> i32;
    fn attacking(&self) -> bool;
    fn attack(&mut self) -> bool;
    fn update(&mut self, tick: u64);
    fn damage(&mut self, amount: i32);
    fn heal(&mut self, amount: i32);

    fn snapshot(&self) -> CombatSnapshot {
        CombatSnapshot {
            health: self.health(),
            max_health: self.max_health(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CombatSnapshot {
    pub(crate) health: i32,
    pub(crate) max_health: i32,
}

impl CombatSnapshot {
    pub(crate) fn fraction(self) -> f32 {
        if self.max_health <= 0 {
            return 0.0;
        }
        (self.health as f32 / self.max_health as f32).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BasicCombat {
    health: i32,
    max_health: i32,
    attack_power: i32,
    attacking: bool,
}

impl BasicCombat {
    pub(crate) fn new(health: i32, attack_power: i32) -> Self {
        Self {
            health,
            max_health: health,
            attack_power,
            attacking: false,
        }
    }
}

impl Combat for BasicCombat {
    fn health(&self) -> i32 {
        self.health
    }

    fn max_health(&self) -> i32 {
        self.max_health
    }

    fn attack_power(&self) -> i32 {
        self.attack_power
    }

    fn attacking(&self) -> bool {
        self.attacking
    }

    fn attack(&mut self) -> bool {
        self.attacking = true;
        true
    }

    fn update(&mut self, _tick: u64) {
        self.attacking = false;
    }

    fn damage(&mut self, amount: i32) {
        self.health -= amount;
    }

    fn heal(&mut self, amount: i32) {
        self.health = self.health.saturating_add(amount).min(self.max_health);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EnemyCombat {
    base: BasicCombat,
    attack_cooldown: u32,
    ticks_since_attack: u32,
    last_updated_tick: Option<u64>,
}

impl EnemyCombat {
    // Counter starts at zero: a fresh enemy waits a full cooldown.
    pub(crate) fn new(health: i32, attack_power: i32, attack_cooldown: u32) -> Self {
        Self {
            base: BasicCombat::new(health, attack_power),
            attack_cooldown,
            ticks_since_attack: 0,
            last_updated_tick: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn ticks_since_attack(&self) -> u32 {
        self.ticks_since_attack
    }
}

impl Combat for EnemyCombat {
    fn health(&self) -> i32 {
        self.base.health()
    }

    fn max_health(&self) -> i32 {
        self.base.max_health()
    }

    fn attack_power(&self) -> i32 {
        self.base.attack_power()
    }

    fn attacking(&self) -> bool {
        self.base.attacking()
    }

    fn attack(&mut self) -> bool {
        if self.ticks_since_attack < self.attack_cooldown {
            return false;
        }
        self.base.attacking = true;
        self.ticks_since_attack = 0;
        true
    }

    /// Repeated calls for the same tick are ignored.
    fn update(&mut self, tick: u64) {
        if self.last_updated_tick == Some(tick) {
            return;
        }
        self.last_updated_tick = Some(tick);
        self.base.update(tick);
        self.ticks_since_attack = self.ticks_since_attack.saturating_add(1);
    }

    fn damage(&mut self, amount: i32) {
        self.base.damage(amount);
    }

    fn heal(&mut self, amount: i32) {
        self.base.heal(amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_attack_always_succeeds() {
        let mut combat = BasicCombat::new(10, 1);
        assert!(combat.attack());
        assert!(combat.attack());
        assert!(combat.attacking());
        combat.update(1);
        assert!(!combat.attacking());
    }

    #[test]
    fn damage_is_not_floored() {
        let mut combat = BasicCombat::new(3, 1);
        combat.damage(5);
        assert_eq!(combat.health(), -2);
    }

    #[test]
    fn heal_clamps_at_max_health() {
        let mut combat = BasicCombat::new(10, 1);
        combat.damage(1);
        combat.heal(2);
        assert_eq!(combat.health(), 10);

        combat.damage(6);
        combat.heal(2);
        assert_eq!(combat.health(), 6);
    }

    #[test]
    fn enemy_waits_full_cooldown_before_first_attack() {
        let mut combat = EnemyCombat::new(3, 1, 3);
        assert!(!combat.attack());
        combat.update(1);
        combat.update(2);
        assert!(!combat.attack());
        combat.update(3);
        assert!(combat.attack());
    }

    #[test]
    fn enemy_attack_succeeds_once_per_cooldown() {
        let mut combat = EnemyCombat::new(3, 1, 60);
        for tick in 1..=60 {
            combat.update(tick);
        }

        let successes = (0..10).filter(|_| combat.attack()).count();
        assert_eq!(successes, 1);
        assert_eq!(combat.ticks_since_attack(), 0);

        for tick in 61..=119 {
            combat.update(tick);
            assert!(!combat.attack());
        }
        combat.update(120);
        assert!(combat.attack());
    }

    #[test]
    fn double_update_in_one_tick_does_not_shorten_cooldown() {
        let mut combat = EnemyCombat::new(3, 1, 2);
        combat.update(7);
        combat.update(7);
        combat.update(7);
        assert_eq!(combat.ticks_since_attack(), 1);
        assert!(!combat.attack());
        combat.update(8);
        assert!(combat.attack());
    }

    #[test]
    fn attacking_flag_clears_on_next_update() {
        let mut combat = EnemyCombat::new(3, 1, 0);
        assert!(combat.attack());
        assert!(combat.attacking());
        combat.update(1);
        assert!(!combat.attacking());
    }

    #[test]
    fn snapshot_fraction_is_clamped() {
        let mut combat = BasicCombat::new(10, 1);
        assert_eq!(combat.snapshot().fraction(), 1.0);
        combat.damage(15);
        assert_eq!(combat.snapshot(), CombatSnapshot { health: -5, max_health: 10 });
        assert_eq!(combat.snapshot().fraction(), 0.0);
    }
}
