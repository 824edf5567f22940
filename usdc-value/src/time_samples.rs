//! `TimeSamples`: parallel time/value vectors plus Held/Linear
//! interpolation between them.

use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Held,
    Linear,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeSamples {
    times: Vec<f64>,
    values: Vec<Value>,
}

impl TimeSamples {
    pub fn new() -> Self {
        Self::default()
    }

    /// `times` and `values` must already be the same length and `times`
    /// sorted ascending; callers (the crate decoder) are responsible for
    /// that invariant since it comes straight off two matched vectors on
    /// disk.
    pub fn from_parts(times: Vec<f64>, values: Vec<Value>) -> Self {
        debug_assert_eq!(times.len(), values.len());
        Self { times, values }
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn value_at_index(&self, i: usize) -> Option<&Value> {
        self.values.get(i)
    }

    /// Evaluate at `time`, per §6.2: exact hit returns that sample
    /// (including a `Block`); before the first or after the last sample
    /// clamps to the boundary; otherwise interpolate Held (step to the
    /// earlier sample) or Linear between the bracketing pair. A `Block` on
    /// either side of a Linear bracket makes the result a `Block` too,
    /// since there is nothing numeric to blend. A Linear bracket between two
    /// non-mixable values (per §4.3, e.g. token/string/asset-path) degrades
    /// to the held (earlier) value rather than producing no value.
    pub fn evaluate(&self, time: f64, interpolation: Interpolation) -> Option<Value> {
        if self.times.is_empty() {
            return None;
        }

        match self
            .times
            .binary_search_by(|t| t.partial_cmp(&time).unwrap())
        {
            Ok(i) => Some(self.values[i].clone()),
            Err(0) => Some(self.values[0].clone()),
            Err(i) if i == self.times.len() => Some(self.values[i - 1].clone()),
            Err(i) => {
                let (t0, v0) = (self.times[i - 1], &self.values[i - 1]);
                let (t1, v1) = (self.times[i], &self.values[i]);
                match interpolation {
                    Interpolation::Held => Some(v0.clone()),
                    Interpolation::Linear => match (v0, v1) {
                        (Value::Block, _) | (_, Value::Block) => Some(Value::Block),
                        _ => {
                            let alpha = (time - t0) / (t1 - t0);
                            v0.lerp(v1, alpha).or_else(|| Some(v0.clone()))
                        }
                    },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Scalar;

    fn sample(times: &[f64], values: &[f64]) -> TimeSamples {
        TimeSamples::from_parts(
            times.to_vec(),
            values.iter().map(|v| Value::Scalar(Scalar::Double(*v))).collect(),
        )
    }

    #[test]
    fn exact_hit_returns_sample() {
        let ts = sample(&[1.0, 2.0, 3.0], &[10.0, 20.0, 30.0]);
        assert_eq!(
            ts.evaluate(2.0, Interpolation::Linear),
            Some(Value::Scalar(Scalar::Double(20.0)))
        );
    }

    #[test]
    fn clamps_before_first_and_after_last() {
        let ts = sample(&[1.0, 2.0], &[10.0, 20.0]);
        assert_eq!(
            ts.evaluate(0.0, Interpolation::Linear),
            Some(Value::Scalar(Scalar::Double(10.0)))
        );
        assert_eq!(
            ts.evaluate(5.0, Interpolation::Linear),
            Some(Value::Scalar(Scalar::Double(20.0)))
        );
    }

    #[test]
    fn held_steps_to_earlier_sample() {
        let ts = sample(&[0.0, 10.0], &[1.0, 2.0]);
        assert_eq!(
            ts.evaluate(5.0, Interpolation::Held),
            Some(Value::Scalar(Scalar::Double(1.0)))
        );
    }

    #[test]
    fn linear_interpolates_between_brackets() {
        let ts = sample(&[0.0, 10.0], &[0.0, 100.0]);
        assert_eq!(
            ts.evaluate(2.5, Interpolation::Linear),
            Some(Value::Scalar(Scalar::Double(25.0)))
        );
    }

    #[test]
    fn block_wins_over_linear_neighbor() {
        let ts = TimeSamples::from_parts(
            vec![0.0, 10.0],
            vec![Value::Block, Value::Scalar(Scalar::Double(100.0))],
        );
        assert_eq!(ts.evaluate(5.0, Interpolation::Linear), Some(Value::Block));
    }

    #[test]
    fn linear_on_non_mixable_type_degrades_to_held() {
        use crate::token::Token;
        let ts = TimeSamples::from_parts(
            vec![0.0, 10.0],
            vec![
                Value::Scalar(Scalar::Tok(Token::from("earlier"))),
                Value::Scalar(Scalar::Tok(Token::from("later"))),
            ],
        );
        assert_eq!(
            ts.evaluate(5.0, Interpolation::Linear),
            Some(Value::Scalar(Scalar::Tok(Token::from("earlier"))))
        );
    }
}
