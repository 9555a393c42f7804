#![allow(dead_code)]
use assert_cmd::{cargo_bin_cmd, Command};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use std::env;
use std::fs;
use std::path::PathBuf;

pub fn converter() -> Command {
    let mut cmd = cargo_bin_cmd!("converter");
    cmd.env_remove("MEDICOES_INPUT").env_remove("MEDICOES_OUTPUT");
    cmd
}

/// A cell of a fixture sheet.
pub enum Cell {
    Text(&'static str),
    Number(f64),
    Date(u16, u8, u8),
    Blank,
}

pub use Cell::{Blank, Date, Number, Text};

/// Column layout of the measurement sheet; the price headers carry the
/// surrounding spaces found in the real export.
pub const HEADERS: &[&str] = &[
    "Projeto",
    "Concessionaria",
    "Contrato",
    "Tipo_Projeto",
    "Localidade",
    "Regional",
    "Zona",
    "Data_Execucao",
    "Data_Envio_Folha_Medicao",
    "Numero_Folha_Medicao",
    "Numero_Medida_Folha_Medicao",
    "Codigo_Mestre",
    "Descricao_Item",
    "Quantidade",
    "Unidade_Medida",
    " Valor_Unitario ",
    " Valor_Total ",
    "Status",
    "Tecnico_Responsavel_Concessionaria",
    "Equipe",
];

/// Four rows: two for P1 on the same day and sheet, one P2 without date or
/// sheet, one P3 with a native date cell.
pub fn sample_rows() -> Vec<Vec<Cell>> {
    vec![
        vec![
            Text("P1"), Text("Light"), Text("C-100"), Text("Manutenção"), Text("Centro"),
            Text("Rio"), Text("Z1"), Text("05/03/2024"), Number(45000.0), Text("01"),
            Number(1.0), Text("M-001"), Text("Poste"), Number(2.0), Text("un"), Number(50.0),
            Number(100.0), Text("Aprovado"), Text("Ana"), Text("E-1"),
        ],
        vec![
            Text("P1"), Text("Enel"), Text("C-999"), Text("Obra"), Text("Norte"),
            Text("SP"), Text("Z9"), Text("05/03/2024"), Number(45001.0), Text("01"),
            Number(1.0), Text("M-002"), Text("Cabo"), Number(10.0), Text("m"), Number(25.0),
            Number(250.0), Text("Pendente"), Text("Bruno"), Text("E-2"),
        ],
        vec![
            Text("P2"), Text("Cemig"), Text("C-200"), Text("Obra"), Blank,
            Text("Sul"), Blank, Blank, Blank, Blank,
            Blank, Text("M-003"), Text("Chave"), Number(1.0), Blank, Text("abc"),
            Text("1.234,56"), Text("Qualquer"), Blank, Blank,
        ],
        vec![
            Text("P3"), Text("CPFL"), Text("C-300"), Text("Obra"), Text("Campinas"),
            Text("SP"), Blank, Date(2024, 7, 19), Blank, Number(2.0),
            Number(3.0), Text("M-004"), Text("Cruzeta"), Number(4.0), Text("pç"), Number(2.5),
            Number(10.0), Text("Correção"), Text("Carla"), Blank,
        ],
    ]
}

/// Temp path for a fixture, removed if it already exists.
pub fn temp_path(name: &str, ext: &str) -> PathBuf {
    let mut path = env::temp_dir();
    path.push(format!("{}_converter.{}", name, ext));
    fs::remove_file(&path).ok();
    path
}

/// Write an xlsx whose first sheet holds `headers` + `rows`. A second sheet
/// with a decoy row is added to check that only the first one is read.
pub fn write_workbook(name: &str, headers: &[&str], rows: &[Vec<Cell>]) -> PathBuf {
    let path = temp_path(name, "xlsx");
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).expect("write header");
    }
    for (idx, cells) in rows.iter().enumerate() {
        let row = idx as u32 + 1;
        for (col, cell) in cells.iter().enumerate() {
            let col = col as u16;
            match cell {
                Text(s) => {
                    sheet.write_string(row, col, *s).expect("write text");
                }
                Number(n) => {
                    sheet.write_number(row, col, *n).expect("write number");
                }
                Date(y, m, d) => {
                    let date = ExcelDateTime::from_ymd(*y, *m, *d).expect("valid date");
                    sheet
                        .write_datetime_with_format(row, col, &date, &date_format)
                        .expect("write date");
                }
                Blank => {}
            }
        }
    }

    let decoy = workbook.add_worksheet();
    decoy.write_string(0, 0, "Projeto").expect("write header");
    decoy.write_string(1, 0, "DECOY").expect("write decoy");

    workbook.save(&path).expect("save workbook");
    path
}

pub fn sample_workbook(name: &str) -> PathBuf {
    write_workbook(name, HEADERS, &sample_rows())
}

pub fn read_json(path: &PathBuf) -> serde_json::Value {
    let content = fs::read_to_string(path).expect("read output json");
    serde_json::from_str(&content).expect("valid json")
}
