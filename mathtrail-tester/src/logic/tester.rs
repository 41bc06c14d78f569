use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::common::scenario::TestScenario;
use crate::logic::game_tester::{GameTester, SimulationPlan, SimulationSummary};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
    #[serde(with = "duration_vec_serde")]
    pub performance_data: Vec<Duration>,
    pub runs: Vec<RunRecord>,
}

/// One simulated game, flattened for CSV output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    pub scenario: String,
    pub seed: u64,
    pub mode: String,
    pub strategy: String,
    pub seats: usize,
    pub turns: usize,
    pub questions: usize,
    pub correct: usize,
    pub score: u32,
    pub final_position: usize,
    pub ending: String,
    pub passed: bool,
}

impl RunRecord {
    fn from_summary(scenario: &str, summary: &SimulationSummary, passed: bool) -> Self {
        let lead = summary.players.first();
        Self {
            scenario: scenario.to_string(),
            seed: summary.seed,
            mode: summary.mode.to_string(),
            strategy: summary.strategy.label().to_string(),
            seats: summary.players.len(),
            turns: summary.turns.len(),
            questions: summary.questions_answered(),
            correct: summary.correct_answers(),
            score: lead.map_or(0, mathtrail_game::Player::score),
            final_position: lead.map_or(0, mathtrail_game::Player::position),
            ending: summary.ending_label().to_string(),
            passed,
        }
    }
}

pub struct LogicTester {
    tester: GameTester,
}

impl LogicTester {
    pub const fn new(tester: GameTester) -> Self {
        Self { tester }
    }

    pub fn run_scenario(
        &self,
        scenario: &TestScenario,
        seeds: &[u64],
        iterations: usize,
    ) -> Vec<ScenarioResult> {
        let mut results = Vec::new();

        for &seed in seeds {
            if self.tester.verbose() {
                println!(
                    "🧪 Testing scenario: {} (mode: {} seed: {})",
                    scenario.name.bright_white(),
                    scenario.plan.mode,
                    seed
                );
            }
            results.push(self.run_single_scenario(scenario, seed, iterations));
        }

        results
    }

    fn run_single_scenario(
        &self,
        scenario: &TestScenario,
        seed: u64,
        iterations: usize,
    ) -> ScenarioResult {
        let (successes, failures, performance_data, runs) =
            self.run_simulation_iterations(&scenario.name, &scenario.plan, seed, iterations);

        let average_duration = if performance_data.is_empty() {
            Duration::ZERO
        } else {
            performance_data.iter().sum::<Duration>()
                / u32::try_from(performance_data.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: scenario.name.clone(),
            seed,
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: successes,
            failures,
            average_duration,
            performance_data,
            runs,
        }
    }

    fn run_simulation_iterations(
        &self,
        name: &str,
        plan: &SimulationPlan,
        seed: u64,
        iterations: usize,
    ) -> (usize, Vec<String>, Vec<Duration>, Vec<RunRecord>) {
        let mut successes = 0;
        let mut failures = Vec::new();
        let mut performance_data = Vec::new();
        let mut runs = Vec::with_capacity(iterations);

        for i in 0..iterations {
            let start_time = Instant::now();
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));
            let summary = self.tester.run_plan(plan, iteration_seed);

            if let Some(err) = evaluate_expectations(plan, &summary) {
                failures.push(format!(
                    "Iteration {} (mode {}, strategy {}, seed {}, turns {}, ending {}): {} | {}",
                    i + 1,
                    summary.mode,
                    summary.strategy.label(),
                    summary.seed,
                    summary.turns.len(),
                    summary.ending_label(),
                    err,
                    describe_last_turns(&summary)
                ));
                if self.tester.verbose() {
                    println!(
                        "  ❌ Iteration {}/{} failed: {}",
                        i + 1,
                        iterations,
                        err.clone().red()
                    );
                }
                runs.push(RunRecord::from_summary(name, &summary, false));
            } else {
                successes += 1;
                let duration = start_time.elapsed();
                performance_data.push(duration);
                if self.tester.verbose() {
                    println!(
                        "  ✅ Iteration {}/{} passed ({duration:?}) turns:{} ending:{} strategy:{}",
                        i + 1,
                        iterations,
                        summary.turns.len(),
                        summary.ending_label(),
                        summary.strategy.label()
                    );
                }
                runs.push(RunRecord::from_summary(name, &summary, true));
            }
        }

        (successes, failures, performance_data, runs)
    }
}

/// Engine errors and invariant violations fail a run before any expectation.
fn evaluate_expectations(plan: &SimulationPlan, summary: &SimulationSummary) -> Option<String> {
    if let Some(error) = &summary.error {
        return Some(error.clone());
    }
    if let Some(violation) = summary.violations.first() {
        return Some(format!("invariant violated: {violation}"));
    }
    plan.expectations
        .iter()
        .find_map(|expectation| expectation.evaluate(summary).err())
        .map(|err| format!("{err:#}"))
}

fn describe_last_turns(summary: &SimulationSummary) -> String {
    if summary.turns.is_empty() {
        return "no turns played".to_string();
    }
    summary
        .turns
        .iter()
        .rev()
        .take(3)
        .map(|turn| {
            format!(
                "turn {} seat {} rolled {} {}->{} score {}",
                turn.turn, turn.seat, turn.roll, turn.start, turn.end, turn.score_after
            )
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

mod duration_vec_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(durations: &[Duration], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis: Vec<u128> = durations.iter().map(Duration::as_millis).collect();
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Vec::<u128>::deserialize(deserializer)?;
        Ok(millis
            .into_iter()
            .map(|m| Duration::from_millis(u64::try_from(m).unwrap_or(0)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::policy::AnswerStrategy;
    use mathtrail_game::ScoringMode;

    fn scenario(plan: SimulationPlan) -> TestScenario {
        TestScenario::simulation("unit", "Unit Plan", plan)
    }

    #[test]
    fn passing_plan_counts_every_iteration() {
        let tester = LogicTester::new(GameTester::try_new(false));
        let plan = SimulationPlan::new(ScoringMode::Freeplay, AnswerStrategy::Perfect)
            .with_expectation(|summary: &SimulationSummary| {
                anyhow::ensure!(summary.game_over, "game did not finish");
                Ok(())
            });
        let results = tester.run_scenario(&scenario(plan), &[1, 2], 3);
        assert_eq!(results.len(), 2);
        for result in &results {
            assert!(result.passed, "{:?}", result.failures);
            assert_eq!(result.successful_iterations, 3);
            assert_eq!(result.runs.len(), 3);
            assert!(result.runs.iter().all(|run| run.ending == "finished"));
        }
    }

    #[test]
    fn failing_expectation_is_reported_with_context() {
        let tester = LogicTester::new(GameTester::try_new(false));
        let plan = SimulationPlan::new(ScoringMode::Freeplay, AnswerStrategy::Careless)
            .with_expectation(|_: &SimulationSummary| -> anyhow::Result<()> {
                anyhow::bail!("always fails")
            });
        let results = tester.run_scenario(&scenario(plan), &[9], 2);
        let result = &results[0];
        assert!(!result.passed);
        assert_eq!(result.failures.len(), 2);
        assert!(result.failures[0].contains("always fails"));
        assert!(result.failures[0].contains("seed 9"));
        assert!(result.failures[1].contains("seed 10"));
        assert!(result.runs.iter().all(|run| !run.passed));
    }

    #[test]
    fn results_serialize_durations_as_millis() {
        let result = ScenarioResult {
            scenario_name: "s".to_string(),
            seed: 1,
            passed: true,
            iterations_run: 1,
            successful_iterations: 1,
            failures: Vec::new(),
            average_duration: Duration::from_millis(12),
            performance_data: vec![Duration::from_millis(12)],
            runs: Vec::new(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["average_duration"], 12);
        assert_eq!(json["performance_data"][0], 12);
    }
}
