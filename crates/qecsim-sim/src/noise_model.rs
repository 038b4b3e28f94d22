//! Gate-attached thermal relaxation noise.

use serde::{Deserialize, Serialize};
use tracing::debug;

use qecsim_ir::{Instruction, InstructionKind, NoiseChannel, NoiseOrigin};

use crate::error::{SimError, SimResult};
use crate::gate_times::GateTimes;

/// Thermal relaxation attached to every timed operation.
///
/// Each unconditional gate is followed by a relaxation channel for the
/// gate's duration on each of its qubits. A measurement is preceded by a
/// channel for the measurement time, and a reset is followed by one for
/// the reset time. Zero-duration and classically conditioned gates stay
/// noiseless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseModel {
    /// Energy relaxation time (ns).
    pub t1: f64,
    /// Dephasing time (ns).
    pub t2: f64,
    /// Operation durations.
    pub gate_times: GateTimes,
}

impl NoiseModel {
    /// Build a thermal relaxation model, checking `0 < t2 <= 2 * t1`.
    pub fn thermal_relaxation(t1: f64, t2: f64, gate_times: GateTimes) -> SimResult<Self> {
        if !(t1 > 0.0 && t2 > 0.0) {
            return Err(SimError::InvalidNoiseModel(format!(
                "T1 and T2 must be positive, got T1 = {t1}, T2 = {t2}"
            )));
        }
        if t2 > 2.0 * t1 {
            return Err(SimError::InvalidNoiseModel(format!(
                "T2 = {t2} exceeds 2*T1 = {}",
                2.0 * t1
            )));
        }
        gate_times.validate()?;
        Ok(Self { t1, t2, gate_times })
    }

    fn relaxation(&self, time: f64, instruction: &Instruction) -> SimResult<Vec<Instruction>> {
        if time <= 0.0 {
            return Ok(vec![]);
        }
        let channel = NoiseChannel::thermal_relaxation(self.t1, self.t2, time)?;
        Ok(instruction
            .qubits
            .iter()
            .map(|&q| Instruction::noise_channel(channel.clone(), NoiseOrigin::Gate, q))
            .collect())
    }

    /// The instruction with its noise channels, in execution order.
    pub fn expand(&self, instruction: &Instruction) -> SimResult<Vec<Instruction>> {
        let mut out = Vec::with_capacity(1 + instruction.qubits.len());
        match &instruction.kind {
            InstructionKind::Gate(gate) if !gate.is_conditional() => {
                let time = self.gate_times.get(gate.name(), instruction.qubits.len());
                out.push(instruction.clone());
                out.extend(self.relaxation(time, instruction)?);
            }
            InstructionKind::Measure => {
                out.extend(self.relaxation(self.gate_times.measure(), instruction)?);
                out.push(instruction.clone());
            }
            InstructionKind::Reset => {
                out.push(instruction.clone());
                out.extend(self.relaxation(self.gate_times.reset(), instruction)?);
            }
            _ => out.push(instruction.clone()),
        }
        Ok(out)
    }

    /// Expand a whole instruction list.
    pub fn expand_all<'a>(
        &self,
        instructions: impl IntoIterator<Item = &'a Instruction>,
    ) -> SimResult<Vec<Instruction>> {
        let mut out = Vec::new();
        for inst in instructions {
            out.extend(self.expand(inst)?);
        }
        debug!(
            t1 = self.t1,
            t2 = self.t2,
            instructions = out.len(),
            "Attached thermal relaxation noise"
        );
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qecsim_ir::{ClassicalCondition, ClbitId, Gate, QubitId, StandardGate};

    fn model() -> NoiseModel {
        NoiseModel::thermal_relaxation(40e3, 60e3, GateTimes::wacqt()).unwrap()
    }

    fn relaxation_time(inst: &Instruction) -> Option<f64> {
        match &inst.kind {
            InstructionKind::NoiseChannel {
                channel: NoiseChannel::ThermalRelaxation { time, .. },
                origin: NoiseOrigin::Gate,
            } => Some(*time),
            _ => None,
        }
    }

    #[test]
    fn test_rejects_unphysical_t2() {
        assert!(NoiseModel::thermal_relaxation(40e3, 90e3, GateTimes::wacqt()).is_err());
        assert!(NoiseModel::thermal_relaxation(0.0, 0.0, GateTimes::wacqt()).is_err());
    }

    #[test]
    fn test_two_qubit_gate_noise_per_qubit() {
        let inst = Instruction::two_qubit_gate(StandardGate::CZ, QubitId(0), QubitId(1));
        let out = model().expand(&inst).unwrap();
        assert_eq!(out.len(), 3);
        assert!(out[0].is_gate());
        assert_eq!(relaxation_time(&out[1]), Some(100.0));
        assert_eq!(out[2].qubits, vec![QubitId(1)]);
    }

    #[test]
    fn test_measure_noise_precedes_projection() {
        let out = model()
            .expand(&Instruction::measure(QubitId(0), ClbitId(0)))
            .unwrap();
        assert_eq!(relaxation_time(&out[0]), Some(300.0));
        assert!(out[1].is_measure());
    }

    #[test]
    fn test_zero_time_and_conditional_gates_noiseless() {
        let rz = Instruction::single_qubit_gate(StandardGate::Rz(0.3), QubitId(0));
        assert_eq!(model().expand(&rz).unwrap().len(), 1);

        let cond = ClassicalCondition::new("c", vec![ClbitId(0)], 1);
        let fb = Instruction::gate(
            Gate::standard(StandardGate::X).with_condition(cond),
            [QubitId(0)],
        );
        assert_eq!(model().expand(&fb).unwrap().len(), 1);
    }
}
