//! Change making.
//!
//! Greedy largest-coin-first is only optimal for canonical coin systems. The
//! Canadian 5/10/25/100/200 set is canonical; for any other configured set
//! the canonical property is checked once at construction and a
//! minimum-coin dynamic programming solver is used when it does not hold.
//!
//! All work happens in multiples of the coins' greatest common divisor, so
//! table sizes depend on the ratio between coins and not on their face value.

use thiserror::Error;

/// Largest supported coin, as a multiple of the coins' common unit.
pub const MAX_COIN_UNITS: u32 = 1_000;

/// Errors that can occur when preparing or making change
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChangeError {
    #[error("No coin denominations configured")]
    NoDenominations,

    #[error("Coin denominations must be non-zero")]
    ZeroDenomination,

    #[error("{largest}¢ coin is more than {MAX_COIN_UNITS} times the {unit}¢ unit")]
    CoinTooLarge { largest: u32, unit: u32 },

    #[error("{amount}¢ cannot be paid exactly with the available coins")]
    Unpayable { amount: u32 },
}

/// Decomposes amounts into coins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeMaker {
    denominations: Vec<u32>,
    unit: u32,
    /// Denominations divided by `unit`, largest first.
    units: Vec<u32>,
    canonical: bool,
}

impl ChangeMaker {
    /// Prepare a change maker for `denominations` (any order, duplicates
    /// allowed).
    pub fn new(denominations: impl IntoIterator<Item = u32>) -> Result<Self, ChangeError> {
        let mut denominations: Vec<u32> = denominations.into_iter().collect();
        if denominations.is_empty() {
            return Err(ChangeError::NoDenominations);
        }
        if denominations.contains(&0) {
            return Err(ChangeError::ZeroDenomination);
        }
        denominations.sort_unstable_by(|a, b| b.cmp(a));
        denominations.dedup();

        let unit = denominations.iter().copied().fold(0, gcd);
        let units: Vec<u32> = denominations.iter().map(|coin| coin / unit).collect();
        if units[0] > MAX_COIN_UNITS {
            return Err(ChangeError::CoinTooLarge {
                largest: denominations[0],
                unit,
            });
        }

        let canonical = is_canonical(&units);
        Ok(Self {
            denominations,
            unit,
            units,
            canonical,
        })
    }

    /// Denominations, largest first.
    pub fn denominations(&self) -> &[u32] {
        &self.denominations
    }

    /// Greatest common divisor of the denominations. Only multiples of it
    /// can ever be paid.
    pub fn unit(&self) -> u32 {
        self.unit
    }

    /// Whether greedy change is optimal for every amount.
    pub fn is_canonical(&self) -> bool {
        self.canonical
    }

    /// Coins paying `amount` exactly, largest first, using as few coins as
    /// possible.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dispenser::vending::ChangeMaker;
    ///
    /// let maker = ChangeMaker::new([5, 10, 25, 100, 200]).unwrap();
    /// assert_eq!(maker.make_change(140).unwrap(), vec![100, 25, 10, 5]);
    /// ```
    pub fn make_change(&self, amount: u32) -> Result<Vec<u32>, ChangeError> {
        if amount % self.unit != 0 {
            return Err(ChangeError::Unpayable { amount });
        }
        let units = amount / self.unit;
        let coins = if self.canonical {
            greedy(&self.units, units).or_else(|| minimal(&self.units, units))
        } else {
            minimal(&self.units, units)
        };
        coins
            .map(|coins| coins.into_iter().map(|coin| coin * self.unit).collect())
            .ok_or(ChangeError::Unpayable { amount })
    }
}

fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

fn greedy(denominations: &[u32], amount: u32) -> Option<Vec<u32>> {
    let mut remaining = amount;
    let mut coins = Vec::new();
    for &coin in denominations {
        while remaining >= coin {
            coins.push(coin);
            remaining -= coin;
        }
    }
    (remaining == 0).then_some(coins)
}

/// Fewest-coin table for every amount up to `limit`: entry `x` holds the
/// coin count and the last coin used, or `None` when `x` is unpayable.
fn min_coin_table(denominations: &[u32], limit: u32) -> Vec<Option<(u32, u32)>> {
    let limit = limit as usize;
    let mut table: Vec<Option<(u32, u32)>> = vec![None; limit + 1];
    table[0] = Some((0, 0));
    for x in 1..=limit {
        let best = denominations
            .iter()
            .filter(|&&coin| coin as usize <= x)
            .filter_map(|&coin| table[x - coin as usize].map(|(count, _)| (count + 1, coin)))
            .min_by_key(|&(count, _)| count);
        table[x] = best;
    }
    table
}

/// Fewest coins for `amount`.
///
/// An optimal payment holds fewer than `largest` smaller coins (any
/// `largest` of them contain a run summing to a multiple of `largest`,
/// which fewer large coins could replace). Above that many times the second
/// largest coin, the largest coin is always part of the answer, so only the
/// remainder goes through the table.
fn minimal(denominations: &[u32], amount: u32) -> Option<Vec<u32>> {
    let largest = denominations[0];
    let Some(&second) = denominations.get(1) else {
        return (amount % largest == 0).then(|| vec![largest; (amount / largest) as usize]);
    };

    let threshold = (largest - 1) * second;
    let leading = if amount > threshold {
        (amount - threshold).div_ceil(largest)
    } else {
        0
    };
    let remainder = amount - leading * largest;

    let table = min_coin_table(denominations, remainder);
    let mut coins = vec![largest; leading as usize];
    let mut x = remainder as usize;
    while x > 0 {
        let (_, coin) = table[x]?;
        coins.push(coin);
        x -= coin as usize;
    }
    coins.sort_unstable_by(|a, b| b.cmp(a));
    Some(coins)
}

/// Compare greedy against the optimum for every amount below the sum of the
/// two largest coins, where the smallest counterexample must lie. That bound
/// needs a unit coin among `units`.
fn is_canonical(units: &[u32]) -> bool {
    if units.last() != Some(&1) {
        return false;
    }
    if units.len() < 2 {
        return true;
    }
    let bound = units[0] + units[1];
    let table = min_coin_table(units, bound);
    (1..bound).all(|x| {
        let optimal = table[x as usize].map(|(count, _)| count);
        let greedy_count = greedy(units, x).map(|coins| coins.len() as u32);
        optimal == greedy_count
    })
}
