//! Recursive-descent parser lowering PyGSTi circuit strings to circuits.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use qbench_ir::{Circuit, Instruction, QubitId, StandardGate};

use super::lexer::{Token, tokenize};
use crate::error::{BenchError, BenchResult};

/// Parse one circuit string into a `num_qubits`-wide circuit ending in a
/// full measurement. `line` is reported in errors.
pub fn parse_circuit(text: &str, num_qubits: usize, line: usize) -> BenchResult<Circuit> {
    let tokens = tokenize(text).map_err(|message| BenchError::Parse { line, message })?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        line,
        num_qubits,
    };
    let ops = parser.parse_circuit()?;

    let width = u32::try_from(num_qubits).map_err(|_| parser.error("too many qubits"))?;
    let mut circuit = Circuit::with_size(text.trim(), width, width);
    for op in ops {
        circuit
            .apply(Instruction::gate(op.gate, op.qubits))
            .map_err(|e| parser.error(e.to_string()))?;
    }
    circuit.measure_all()?;
    Ok(circuit)
}

/// A resolved gate application.
#[derive(Debug, Clone)]
struct GateOp {
    gate: StandardGate,
    qubits: Vec<QubitId>,
}

/// Parser state.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    line: usize,
    num_qubits: usize,
}

impl Parser {
    fn error(&self, message: impl Into<String>) -> BenchError {
        BenchError::Parse {
            line: self.line,
            message: message.into(),
        }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(token))
    }

    fn consume(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> BenchResult<()> {
        match self.advance() {
            Some(found) if std::mem::discriminant(&found) == std::mem::discriminant(expected) => {
                Ok(())
            }
            Some(found) => Err(self.error(format!("expected '{expected}', found '{found}'"))),
            None => Err(self.error(format!("expected '{expected}', found end of input"))),
        }
    }

    fn expect_index(&mut self) -> BenchResult<u32> {
        match self.advance() {
            Some(Token::Index(value)) => Ok(value),
            Some(found) => Err(self.error(format!("expected an index, found '{found}'"))),
            None => Err(self.error("expected an index, found end of input")),
        }
    }

    /// `circuit := ('{}' | layer+) ('@' '(' index (',' index)* ')')?`
    fn parse_circuit(&mut self) -> BenchResult<Vec<GateOp>> {
        if self.is_eof() {
            return Err(self.error("empty circuit string, use '{}' for the empty circuit"));
        }

        let mut ops = Vec::new();
        if !self.consume(&Token::Empty) {
            while !self.is_eof() && !self.check(&Token::At) {
                ops.extend(self.parse_layer()?);
            }
        }

        if self.consume(&Token::At) {
            self.parse_line_labels()?;
        }

        if let Some(token) = self.peek() {
            return Err(self.error(format!("unexpected '{token}' after circuit")));
        }
        Ok(ops)
    }

    fn parse_line_labels(&mut self) -> BenchResult<()> {
        self.expect(&Token::LParen)?;
        let mut labels = vec![self.expect_index()?];
        while self.consume(&Token::Comma) {
            labels.push(self.expect_index()?);
        }
        self.expect(&Token::RParen)?;

        for (i, &label) in labels.iter().enumerate() {
            if label as usize >= self.num_qubits {
                return Err(self.error(format!(
                    "line label {label} out of range for {} qubits",
                    self.num_qubits
                )));
            }
            if labels[..i].contains(&label) {
                return Err(self.error(format!("duplicate line label {label}")));
            }
        }
        Ok(())
    }

    /// `layer := gate | '[' gate* ']' | '(' layer+ ')' ('^' index)?`
    fn parse_layer(&mut self) -> BenchResult<Vec<GateOp>> {
        match self.advance() {
            Some(Token::Gate(name)) => self.parse_gate(&name),
            Some(Token::LBracket) => {
                let mut ops = Vec::new();
                while !self.consume(&Token::RBracket) {
                    match self.advance() {
                        Some(Token::Gate(name)) => ops.extend(self.parse_gate(&name)?),
                        Some(found) => {
                            return Err(self.error(format!(
                                "expected a gate inside '[...]', found '{found}'"
                            )));
                        }
                        None => return Err(self.error("unterminated '['")),
                    }
                }
                Ok(ops)
            }
            Some(Token::LParen) => {
                let mut body = Vec::new();
                while !self.consume(&Token::RParen) {
                    if self.is_eof() {
                        return Err(self.error("unterminated '('"));
                    }
                    body.extend(self.parse_layer()?);
                }
                let repeat = if self.consume(&Token::Caret) {
                    self.expect_index()? as usize
                } else {
                    1
                };
                let mut ops = Vec::with_capacity(body.len() * repeat);
                for _ in 0..repeat {
                    ops.extend(body.iter().cloned());
                }
                Ok(ops)
            }
            Some(found) => Err(self.error(format!("unexpected '{found}'"))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    /// A gate name followed by `:index` qubit labels.
    fn parse_gate(&mut self, name: &str) -> BenchResult<Vec<GateOp>> {
        let mut indices = Vec::new();
        while self.consume(&Token::Colon) {
            indices.push(self.expect_index()?);
        }

        let (gate, arity) =
            gate_for(name).ok_or_else(|| self.error(format!("unknown gate '{name}'")))?;

        if let Some(&q) = indices.iter().find(|&&q| q as usize >= self.num_qubits) {
            return Err(self.error(format!(
                "qubit {q} of '{name}' out of range for {} qubits",
                self.num_qubits
            )));
        }

        if indices.is_empty() {
            // An unlabelled idle acts on the whole register.
            if matches!(gate, StandardGate::I) {
                return Ok((0..self.num_qubits as u32)
                    .map(|q| GateOp {
                        gate: StandardGate::I,
                        qubits: vec![QubitId(q)],
                    })
                    .collect());
            }
            if arity == 1 && self.num_qubits == 1 {
                indices.push(0);
            } else {
                return Err(self.error(format!(
                    "'{name}' needs qubit labels in a {}-qubit circuit",
                    self.num_qubits
                )));
            }
        }

        if indices.len() != arity {
            return Err(self.error(format!(
                "'{name}' acts on {arity} qubit(s), got {}",
                indices.len()
            )));
        }
        Ok(vec![GateOp {
            gate,
            qubits: indices.into_iter().map(QubitId).collect(),
        }])
    }
}

/// Map a PyGSTi gate name to a standard gate and its arity.
fn gate_for(name: &str) -> Option<(StandardGate, usize)> {
    let single = match name {
        "Gi" | "Gidle" => Some(StandardGate::I),
        "Gh" => Some(StandardGate::H),
        "Gs" => Some(StandardGate::S),
        "Gt" => Some(StandardGate::T),
        _ => None,
    };
    if let Some(gate) = single {
        return Some((gate, 1));
    }

    let double = match name {
        "Gcnot" => Some(StandardGate::CX),
        "Gcz" | "Gcphase" => Some(StandardGate::CZ),
        "Gswap" => Some(StandardGate::Swap),
        _ => None,
    };
    if let Some(gate) = double {
        return Some((gate, 2));
    }

    let rest = name.strip_prefix('G')?;
    let mut chars = rest.chars();
    let axis = chars.next()?;
    let angle = match chars.as_str() {
        "" | "pi2" => FRAC_PI_2,
        "pi4" => FRAC_PI_4,
        "pi" => PI,
        "mpi2" => -FRAC_PI_2,
        "mpi4" => -FRAC_PI_4,
        _ => return None,
    };
    let gate = match axis {
        'x' => StandardGate::Rx(angle),
        'y' => StandardGate::Ry(angle),
        'z' => StandardGate::Rz(angle),
        _ => return None,
    };
    Some((gate, 1))
}
