// the two passes

use std::collections::BTreeMap;
use std::fmt::Write as _;

use log::debug;

use crate::tokenizer::{ErrCode, ParseError, Token, Tokenizer};

const MACHINE_SIZE: i32 = 512;
const MAX_DEFS: i32 = 16;
const MAX_USES: i32 = 16;
const MAX_SYMBOLS: usize = 256;
const MAX_MODULES: usize = 128;
const MAX_SYMBOL_LEN: usize = 16;

#[derive(Debug)]
struct Symbol {
    value: i32,
    defining_module: usize,
    used: bool,
    redefined: bool,
}

#[derive(Default, Debug)]
pub struct Linker {
    // BTreeMap keeps the symbol table output alphabetical
    symbols: BTreeMap<String, Symbol>,
    module_bases: Vec<i32>,
    warnings: Vec<String>,
    total_instructions: i32,
    pub memory_map: Vec<i32>,
}

impl Linker {
    /// Run both passes and return the full report text.
    pub fn link(input: &str) -> Result<(Linker, String), ParseError> {
        let mut linker = Linker::default();
        linker.pass1(input)?;

        let mut out = String::new();
        linker.flush_warnings(&mut out);
        linker.write_symbol_table(&mut out);
        let _ = writeln!(out, "Memory Map");
        linker.pass2(input, &mut out)?;
        linker.flush_warnings(&mut out);
        Ok((linker, out))
    }

    fn flush_warnings(&mut self, out: &mut String) {
        for w in self.warnings.drain(..) {
            let _ = writeln!(out, "{}", w);
        }
        out.push('\n');
    }

    fn write_symbol_table(&self, out: &mut String) {
        let _ = writeln!(out, "Symbol Table");
        for (name, sym) in &self.symbols {
            if sym.redefined {
                let _ = writeln!(
                    out,
                    "{}={} Error: This variable is multiple times defined; first value used",
                    name, sym.value
                );
            } else {
                let _ = writeln!(out, "{}={}", name, sym.value);
            }
        }
        out.push('\n');
    }

    fn pass1(&mut self, input: &str) -> Result<(), ParseError> {
        let mut toks = Tokenizer::new(input);

        'modules: loop {
            let module = self.module_bases.len();
            let def_count = match read_int(&mut toks)? {
                Some(tok) => tok,
                None => break,
            };
            if def_count.1 > MAX_DEFS {
                return Err(def_count.0.error(ErrCode::TooManyDefInModule));
            }

            for _ in 0..def_count.1 {
                let sym = read_symbol(&mut toks)?;
                let value = match read_int(&mut toks)? {
                    Some(tok) => tok.1,
                    None => break 'modules,
                };
                self.define_symbol(&sym, value, module)?;
            }

            let use_count = match read_int(&mut toks)? {
                Some(tok) => tok,
                None => break,
            };
            if use_count.1 > MAX_USES {
                return Err(use_count.0.error(ErrCode::TooManyUseInModule));
            }
            for _ in 0..use_count.1 {
                read_symbol(&mut toks)?;
            }

            let code_count = match read_int(&mut toks)? {
                Some(tok) => tok,
                None => break,
            };
            if self.total_instructions + code_count.1 > MACHINE_SIZE {
                return Err(code_count.0.error(ErrCode::TooManyInstr));
            }
            for _ in 0..code_count.1 {
                read_marie(&mut toks)?;
                if read_int(&mut toks)?.is_none() {
                    break 'modules;
                }
            }

            // definitions past the module end fall back to the module base
            for (name, sym) in self.symbols.iter_mut() {
                if sym.defining_module == module
                    && sym.value - self.total_instructions >= code_count.1
                {
                    self.warnings.push(format!(
                        "Warning: Module {}: {}={} valid=[0..{}] assume zero relative",
                        module,
                        name,
                        sym.value - self.total_instructions,
                        code_count.1 - 1
                    ));
                    sym.value = self.total_instructions;
                }
            }

            self.module_bases.push(self.total_instructions);
            self.total_instructions += code_count.1;
            debug!(
                "module {} parsed: base {} size {}",
                module,
                self.module_bases[module],
                code_count.1
            );

            if self.module_bases.len() > MAX_MODULES {
                return Err(code_count.0.error(ErrCode::TooManyInstr));
            }
        }
        Ok(())
    }

    fn define_symbol(
        &mut self,
        sym: &Token<'_>,
        value: i32,
        module: usize,
    ) -> Result<(), ParseError> {
        if let Some(existing) = self.symbols.get_mut(sym.text) {
            if !existing.redefined {
                existing.redefined = true;
                self.warnings.push(format!(
                    "Warning: Module {}: {} redefinition ignored",
                    module, sym.text
                ));
            }
            return Ok(());
        }
        if self.symbols.len() >= MAX_SYMBOLS {
            return Err(sym.error(ErrCode::TooManyDefInModule));
        }
        self.symbols.insert(
            sym.text.to_string(),
            Symbol {
                value: value + self.total_instructions,
                defining_module: module,
                used: false,
                redefined: false,
            },
        );
        Ok(())
    }

    fn pass2(&mut self, input: &str, out: &mut String) -> Result<(), ParseError> {
        let mut toks = Tokenizer::new(input);
        let mut module = 0usize;
        let mut address = 0i32;

        'modules: loop {
            let def_count = match read_int(&mut toks)? {
                Some(tok) => tok.1,
                None => break,
            };
            for _ in 0..def_count {
                read_symbol(&mut toks)?;
                if read_int(&mut toks)?.is_none() {
                    break 'modules;
                }
            }

            let use_count = match read_int(&mut toks)? {
                Some(tok) => tok.1,
                None => break,
            };
            let mut use_list = Vec::with_capacity(use_count as usize);
            for _ in 0..use_count {
                use_list.push(read_symbol(&mut toks)?.text.to_string());
            }
            let mut use_seen = vec![false; use_list.len()];

            let code_count = match read_int(&mut toks)? {
                Some(tok) => tok.1,
                None => break,
            };
            for _ in 0..code_count {
                let mode = read_marie(&mut toks)?;
                let instruction = match read_int(&mut toks)? {
                    Some(tok) => tok.1,
                    None => break 'modules,
                };
                let line = self.relocate(mode, instruction, module, code_count, &use_list, &mut use_seen);
                let _ = writeln!(out, "{:03}: {}", address, line);
                address += 1;
            }

            for (i, name) in use_list.iter().enumerate() {
                if !use_seen[i] {
                    let _ = writeln!(
                        out,
                        "Warning: Module {}: uselist[{}]={} was not used",
                        module, i, name
                    );
                }
            }
            module += 1;
        }
        out.push('\n');

        for (name, sym) in &self.symbols {
            if !sym.used {
                self.warnings.push(format!(
                    "Warning: Module {}: {} was defined but never used",
                    sym.defining_module, name
                ));
            }
        }
        Ok(())
    }

    /// Resolve one instruction; illegal values are substituted and noted in
    /// the output line, never treated as process errors.
    fn relocate(
        &mut self,
        mode: char,
        instruction: i32,
        module: usize,
        module_size: i32,
        use_list: &[String],
        use_seen: &mut [bool],
    ) -> String {
        let opcode = instruction / 1000;
        let operand = instruction % 1000;

        if opcode >= 10 {
            self.memory_map.push(9999);
            return "9999 Error: Illegal opcode; treated as 9999".to_string();
        }

        let (value, note) = match mode {
            'I' => {
                if operand >= 900 {
                    (
                        opcode * 1000 + 999,
                        Some("Error: Illegal immediate operand; treated as 999".to_string()),
                    )
                } else {
                    (instruction, None)
                }
            }
            'A' => {
                if operand >= MACHINE_SIZE {
                    (
                        opcode * 1000,
                        Some("Error: Absolute address exceeds machine size; zero used".to_string()),
                    )
                } else {
                    (instruction, None)
                }
            }
            'R' => {
                // a truncated final module never registered a base
                let base = self.module_bases.get(module).copied().unwrap_or(0);
                if operand >= module_size {
                    (
                        opcode * 1000 + base,
                        Some(
                            "Error: Relative address exceeds module size; relative zero used"
                                .to_string(),
                        ),
                    )
                } else {
                    (opcode * 1000 + operand + base, None)
                }
            }
            'E' => {
                if operand as usize >= use_list.len() {
                    (
                        opcode * 1000,
                        Some(
                            "Error: External operand exceeds length of uselist; treated as relative=0"
                                .to_string(),
                        ),
                    )
                } else {
                    let name = &use_list[operand as usize];
                    use_seen[operand as usize] = true;
                    match self.symbols.get_mut(name) {
                        Some(sym) => {
                            sym.used = true;
                            (opcode * 1000 + sym.value, None)
                        }
                        None => (
                            opcode * 1000,
                            Some(format!("Error: {} is not defined; zero used", name)),
                        ),
                    }
                }
            }
            'M' => {
                if operand as usize >= self.module_bases.len() {
                    (
                        opcode * 1000,
                        Some("Error: Illegal module operand ; treated as module=0".to_string()),
                    )
                } else {
                    (opcode * 1000 + self.module_bases[operand as usize], None)
                }
            }
            _ => unreachable!("read_marie admits only MARIE modes"),
        };

        self.memory_map.push(value);
        match note {
            Some(note) => format!("{:04} {}", value, note),
            None => format!("{:04}", value),
        }
    }
}

fn read_int<'a>(toks: &mut Tokenizer<'a>) -> Result<Option<(Token<'a>, i32)>, ParseError> {
    let tok = match toks.next_token() {
        Some(tok) => tok,
        None => return Ok(None),
    };
    match tok.text.parse::<i32>() {
        Ok(v) => Ok(Some((tok, v))),
        Err(_) => Err(tok.error(ErrCode::NumExpected)),
    }
}

fn read_symbol<'a>(toks: &mut Tokenizer<'a>) -> Result<Token<'a>, ParseError> {
    let tok = match toks.next_token() {
        Some(tok) => tok,
        None => return Err(toks.eof_error(ErrCode::SymExpected)),
    };
    let mut chars = tok.text.chars();
    if !chars.next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return Err(tok.error(ErrCode::SymExpected));
    }
    if tok.text.len() > MAX_SYMBOL_LEN {
        return Err(tok.error(ErrCode::SymTooLong));
    }
    if !chars.all(|c| c.is_ascii_alphanumeric()) {
        return Err(tok.error(ErrCode::SymExpected));
    }
    Ok(tok)
}

fn read_marie(toks: &mut Tokenizer<'_>) -> Result<char, ParseError> {
    let tok = match toks.next_token() {
        Some(tok) => tok,
        None => return Err(toks.eof_error(ErrCode::MarieExpected)),
    };
    match tok.text {
        "M" => Ok('M'),
        "A" => Ok('A'),
        "R" => Ok('R'),
        "I" => Ok('I'),
        "E" => Ok('E'),
        _ => Err(tok.error(ErrCode::MarieExpected)),
    }
}
