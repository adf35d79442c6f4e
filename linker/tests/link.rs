use linker::{ErrCode, Linker};

#[test]
fn links_a_two_module_program() {
    let input = "\
2 a 0 b 1
1 c
3 I 1900 R 5004 E 8000
1 c 0
0
3 A 9000 E 7001 A 5
";
    let (linked, report) = Linker::link(input).unwrap();

    let expected = r"
Symbol Table
a=0
b=1
c=3

Memory Map
000: 1999 Error: Illegal immediate operand; treated as 999
001: 5000 Error: Relative address exceeds module size; relative zero used
002: 8003
003: 9000
004: 7000 Error: External operand exceeds length of uselist; treated as relative=0
005: 0005

Warning: Module 0: a was defined but never used
Warning: Module 0: b was defined but never used

";
    assert_eq!(report, expected);
    assert_eq!(linked.memory_map, vec![1999, 5000, 8003, 9000, 7000, 5]);
}

#[test]
fn warns_on_redefinition_and_out_of_range_definitions() {
    let input = "\
1 x 3
0
2 I 100 I 200
1 x 1
0
2 I 300 A 99999
";
    let (linked, report) = Linker::link(input).unwrap();

    let expected = "\
Warning: Module 0: x=3 valid=[0..1] assume zero relative
Warning: Module 1: x redefinition ignored

Symbol Table
x=0 Error: This variable is multiple times defined; first value used

Memory Map
000: 0100
001: 0200
002: 0300
003: 9999 Error: Illegal opcode; treated as 9999

Warning: Module 0: x was defined but never used

";
    assert_eq!(report, expected);
    assert_eq!(linked.memory_map, vec![100, 200, 300, 9999]);
}

#[test]
fn resolves_module_mode_and_undefined_externals() {
    let input = "\
0
1 y
2 M 1001 E 2000
0
0
1 M 1007
";
    let (linked, report) = Linker::link(input).unwrap();

    // module 1 starts at base 2; module operand 7 is out of range
    assert!(report.contains("000: 1002"));
    assert!(report.contains("001: 2000 Error: y is not defined; zero used"));
    assert!(report.contains("002: 1000 Error: Illegal module operand ; treated as module=0"));
    assert_eq!(linked.memory_map, vec![1002, 2000, 1000]);
}

#[test]
fn unused_uselist_entries_warn_inline() {
    let input = "\
1 a 0
0
1 R 1000
0
2 a b
1 E 1000
";
    let (_, report) = Linker::link(input).unwrap();
    assert!(report.contains("Warning: Module 1: uselist[1]=b was not used"));
    assert!(!report.contains("uselist[0]"));
    // `a` resolved through the uselist, so it is used
    assert!(!report.contains("a was defined but never used"));
}

#[test]
fn parse_errors_carry_positions() {
    let err = Linker::link("abc\n").unwrap_err();
    assert_eq!((err.line, err.offset, err.code), (1, 1, ErrCode::NumExpected));

    let err = Linker::link("1 2x 3\n0\n0\n").unwrap_err();
    assert_eq!((err.line, err.offset, err.code), (1, 3, ErrCode::SymExpected));

    let err = Linker::link("1 abcdefghijklmnopq 3\n0\n0\n").unwrap_err();
    assert_eq!(err.code, ErrCode::SymTooLong);

    let err = Linker::link("0\n0\n1 X 1000\n").unwrap_err();
    assert_eq!((err.line, err.offset, err.code), (3, 3, ErrCode::MarieExpected));

    let err = Linker::link("17 a 0\n").unwrap_err();
    assert_eq!(err.code, ErrCode::TooManyDefInModule);

    let err = Linker::link("0\n17\n").unwrap_err();
    assert_eq!(err.code, ErrCode::TooManyUseInModule);

    let err = Linker::link("0\n0\n600\n").unwrap_err();
    assert_eq!(err.code, ErrCode::TooManyInstr);

    // symbol expected but the input ended
    let err = Linker::link("1 ").unwrap_err();
    assert_eq!((err.line, err.offset, err.code), (1, 3, ErrCode::SymExpected));
}
