//! State rules for tax year 2025: the 50 states and the District of Columbia.

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::ConfigError;
use crate::models::{BracketSchedule, FilingStatusTable};
use crate::states::calculator::{StandardStateCalculator, StateCalculator};
use crate::states::config::{
    ExemptionKind, LocalJurisdiction, LocalSchedule, LocalTaxBase, PhaseOut, PhaseOutReduction,
    StartingIncome, StateTaxConfig, StateTaxSchedule,
};
use crate::states::overrides::{
    DelawareCalculator, FederalTaxDeductionCalculator, FederalTaxDeductionLimit,
};

const YEAR: i32 = 2025;

type Calculator = Arc<dyn StateCalculator>;

pub(super) fn calculators() -> Result<Vec<Calculator>, ConfigError> {
    Ok(vec![
        alabama()?,
        standard(none("AK", "Alaska")),
        arizona(),
        arkansas()?,
        california()?,
        colorado(),
        connecticut()?,
        delaware()?,
        district_of_columbia()?,
        standard(none("FL", "Florida")),
        georgia(),
        hawaii()?,
        idaho()?,
        illinois(),
        indiana(),
        iowa(),
        kansas()?,
        kentucky(),
        louisiana(),
        maine()?,
        maryland()?,
        massachusetts(),
        michigan(),
        minnesota()?,
        mississippi()?,
        missouri()?,
        montana()?,
        nebraska()?,
        standard(none("NV", "Nevada")),
        standard(none("NH", "New Hampshire")),
        new_jersey()?,
        new_mexico()?,
        new_york()?,
        north_carolina(),
        north_dakota()?,
        ohio()?,
        oklahoma()?,
        oregon()?,
        pennsylvania(),
        rhode_island()?,
        south_carolina()?,
        standard(none("SD", "South Dakota")),
        standard(none("TN", "Tennessee")),
        standard(none("TX", "Texas")),
        utah(),
        vermont()?,
        virginia()?,
        standard(none("WA", "Washington")),
        west_virginia()?,
        wisconsin()?,
        standard(none("WY", "Wyoming")),
    ])
}

// =============================================================================
// Helpers
// =============================================================================

fn standard(config: StateTaxConfig) -> Calculator {
    Arc::new(StandardStateCalculator::new(config))
}

fn none(
    code: &str,
    name: &str,
) -> StateTaxConfig {
    StateTaxConfig::new(code, YEAR, name, StateTaxSchedule::None)
}

fn flat(
    code: &str,
    name: &str,
    rate: Decimal,
) -> StateTaxConfig {
    StateTaxConfig::new(code, YEAR, name, StateTaxSchedule::Flat(rate))
}

fn graduated(
    code: &str,
    name: &str,
    schedule: StateTaxSchedule,
) -> StateTaxConfig {
    StateTaxConfig::new(code, YEAR, name, schedule)
}

fn brackets(pairs: &[(Decimal, Decimal)]) -> Result<BracketSchedule, ConfigError> {
    BracketSchedule::from_pairs(pairs)
}

/// One table for every filing status.
fn uniform(pairs: &[(Decimal, Decimal)]) -> Result<StateTaxSchedule, ConfigError> {
    Ok(StateTaxSchedule::Graduated(FilingStatusTable::uniform(brackets(pairs)?)))
}

/// Joint floors are twice the single floors.
fn doubled(pairs: &[(Decimal, Decimal)]) -> Result<StateTaxSchedule, ConfigError> {
    let single = brackets(pairs)?;
    let joint = single.scaled(dec!(2))?;
    Ok(StateTaxSchedule::Graduated(FilingStatusTable::single_joint(single, joint)))
}

fn single_joint(
    single: &[(Decimal, Decimal)],
    joint: &[(Decimal, Decimal)],
) -> Result<StateTaxSchedule, ConfigError> {
    Ok(StateTaxSchedule::Graduated(FilingStatusTable::single_joint(
        brackets(single)?,
        brackets(joint)?,
    )))
}

fn single_joint_hoh(
    single: &[(Decimal, Decimal)],
    joint: &[(Decimal, Decimal)],
    head_of_household: &[(Decimal, Decimal)],
) -> Result<StateTaxSchedule, ConfigError> {
    Ok(StateTaxSchedule::Graduated(FilingStatusTable::single_joint_hoh(
        brackets(single)?,
        brackets(joint)?,
        brackets(head_of_household)?,
    )))
}

/// `amount` per filer: doubled on a joint return.
fn per_filer(amount: Decimal) -> FilingStatusTable<Decimal> {
    FilingStatusTable::single_joint(amount, amount * dec!(2))
}

/// States that adopt the federal standard deduction.
fn federal_standard_deduction() -> FilingStatusTable<Decimal> {
    FilingStatusTable::federal(dec!(15750), dec!(31500), dec!(15750), dec!(23625))
}

fn earned_income_local(
    name: &str,
    cities: &[&str],
    rate: Decimal,
) -> LocalJurisdiction {
    LocalJurisdiction::flat(name, cities, LocalTaxBase::EarnedIncome, rate)
}

// =============================================================================
// States
// =============================================================================

fn alabama() -> Result<Calculator, ConfigError> {
    let config = graduated(
        "AL",
        "Alabama",
        single_joint(
            &[(dec!(0), dec!(0.02)), (dec!(500), dec!(0.04)), (dec!(3000), dec!(0.05))],
            &[(dec!(0), dec!(0.02)), (dec!(1000), dec!(0.04)), (dec!(6000), dec!(0.05))],
        )?,
    )
    .with_standard_deduction(FilingStatusTable::federal(
        dec!(3000),
        dec!(8500),
        dec!(4250),
        dec!(5200),
    ))
    .with_standard_deduction_phase_out(PhaseOut {
        threshold: FilingStatusTable::federal(dec!(23000), dec!(23000), dec!(11500), dec!(23000)),
        reduction: PhaseOutReduction::PerStep {
            step: dec!(500),
            amount: dec!(25),
            per_exemption: false,
        },
    })
    .with_itemized()
    .with_exemptions(
        ExemptionKind::Deduction,
        FilingStatusTable::federal(dec!(1500), dec!(3000), dec!(1500), dec!(3000)),
        dec!(1000),
    )
    .with_retirement_exclusion(Some(dec!(6000)), Some(65));
    Ok(Arc::new(FederalTaxDeductionCalculator::new(
        config,
        FederalTaxDeductionLimit::Unlimited,
    )))
}

fn arizona() -> Calculator {
    standard(
        flat("AZ", "Arizona", dec!(0.025))
            .with_standard_deduction(federal_standard_deduction())
            .with_itemized()
            .with_dependent_credit(dec!(100), false, Some(17)),
    )
}

fn arkansas() -> Result<Calculator, ConfigError> {
    Ok(standard(
        graduated(
            "AR",
            "Arkansas",
            uniform(&[
                (dec!(0), dec!(0)),
                (dec!(5500), dec!(0.02)),
                (dec!(10900), dec!(0.03)),
                (dec!(15600), dec!(0.034)),
                (dec!(25700), dec!(0.039)),
            ])?,
        )
        .with_standard_deduction(per_filer(dec!(2410)))
        .with_itemized()
        .with_exemptions(ExemptionKind::Credit, per_filer(dec!(29)), dec!(29))
        .with_retirement_exclusion(Some(dec!(6000)), None),
    ))
}

fn california() -> Result<Calculator, ConfigError> {
    Ok(standard(
        graduated(
            "CA",
            "California",
            single_joint_hoh(
                &[
                    (dec!(0), dec!(0.01)),
                    (dec!(10756), dec!(0.02)),
                    (dec!(25499), dec!(0.04)),
                    (dec!(40245), dec!(0.06)),
                    (dec!(55866), dec!(0.08)),
                    (dec!(70606), dec!(0.093)),
                    (dec!(360659), dec!(0.103)),
                    (dec!(432787), dec!(0.113)),
                    (dec!(721314), dec!(0.123)),
                ],
                &[
                    (dec!(0), dec!(0.01)),
                    (dec!(21512), dec!(0.02)),
                    (dec!(50998), dec!(0.04)),
                    (dec!(80490), dec!(0.06)),
                    (dec!(111732), dec!(0.08)),
                    (dec!(141212), dec!(0.093)),
                    (dec!(721318), dec!(0.103)),
                    (dec!(865574), dec!(0.113)),
                    (dec!(1442628), dec!(0.123)),
                ],
                &[
                    (dec!(0), dec!(0.01)),
                    (dec!(21527), dec!(0.02)),
                    (dec!(51000), dec!(0.04)),
                    (dec!(65744), dec!(0.06)),
                    (dec!(81364), dec!(0.08)),
                    (dec!(96107), dec!(0.093)),
                    (dec!(490493), dec!(0.103)),
                    (dec!(588593), dec!(0.113)),
                    (dec!(980987), dec!(0.123)),
                ],
            )?,
        )
        // Behavioral health services tax
        .with_surtax(FilingStatusTable::uniform(dec!(1000000)), dec!(0.01))
        .with_standard_deduction(FilingStatusTable::single_joint(dec!(5540), dec!(11080)))
        .with_itemized()
        .with_exemptions(ExemptionKind::Credit, per_filer(dec!(149)), dec!(461))
        .with_exemption_phase_out(PhaseOut {
            threshold: FilingStatusTable::federal(
                dec!(252203),
                dec!(504411),
                dec!(252203),
                dec!(378310),
            ),
            reduction: PhaseOutReduction::PerStep {
                step: dec!(2500),
                amount: dec!(6),
                per_exemption: true,
            },
        })
        .adding_back_municipal_interest(),
    ))
}

fn colorado() -> Calculator {
    standard(
        flat("CO", "Colorado", dec!(0.044))
            .starting_from(StartingIncome::FederalTaxableIncome)
            .with_retirement_exclusion(Some(dec!(24000)), Some(65))
            .with_eitc(dec!(0.35), true),
    )
}

fn connecticut() -> Result<Calculator, ConfigError> {
    Ok(standard(
        graduated(
            "CT",
            "Connecticut",
            single_joint_hoh(
                &[
                    (dec!(0), dec!(0.02)),
                    (dec!(10000), dec!(0.045)),
                    (dec!(50000), dec!(0.055)),
                    (dec!(100000), dec!(0.06)),
                    (dec!(200000), dec!(0.065)),
                    (dec!(250000), dec!(0.069)),
                    (dec!(500000), dec!(0.0699)),
                ],
                &[
                    (dec!(0), dec!(0.02)),
                    (dec!(20000), dec!(0.045)),
                    (dec!(100000), dec!(0.055)),
                    (dec!(200000), dec!(0.06)),
                    (dec!(400000), dec!(0.065)),
                    (dec!(500000), dec!(0.069)),
                    (dec!(1000000), dec!(0.0699)),
                ],
                &[
                    (dec!(0), dec!(0.02)),
                    (dec!(16000), dec!(0.045)),
                    (dec!(80000), dec!(0.055)),
                    (dec!(160000), dec!(0.06)),
                    (dec!(320000), dec!(0.065)),
                    (dec!(400000), dec!(0.069)),
                    (dec!(800000), dec!(0.0699)),
                ],
            )?,
        )
        .with_exemptions(
            ExemptionKind::Deduction,
            FilingStatusTable::federal(dec!(15000), dec!(24000), dec!(12000), dec!(19000)),
            dec!(0),
        )
        .with_exemption_phase_out(PhaseOut {
            threshold: FilingStatusTable::federal(
                dec!(30000),
                dec!(48000),
                dec!(24000),
                dec!(38000),
            ),
            reduction: PhaseOutReduction::PerStep {
                step: dec!(1000),
                amount: dec!(1000),
                per_exemption: false,
            },
        })
        .with_eitc(dec!(0.40), true),
    ))
}

fn delaware() -> Result<Calculator, ConfigError> {
    let config = graduated(
        "DE",
        "Delaware",
        uniform(&[
            (dec!(0), dec!(0)),
            (dec!(2000), dec!(0.022)),
            (dec!(5000), dec!(0.039)),
            (dec!(10000), dec!(0.048)),
            (dec!(20000), dec!(0.052)),
            (dec!(25000), dec!(0.0555)),
            (dec!(60000), dec!(0.066)),
        ])?,
    )
    .with_standard_deduction(per_filer(dec!(3250)))
    .with_itemized()
    .with_exemptions(ExemptionKind::Credit, per_filer(dec!(110)), dec!(110))
    .with_retirement_exclusion(Some(dec!(12500)), Some(60))
    .with_eitc(dec!(0.20), false);
    Ok(Arc::new(DelawareCalculator::new(config)))
}

fn district_of_columbia() -> Result<Calculator, ConfigError> {
    Ok(standard(
        graduated(
            "DC",
            "District of Columbia",
            uniform(&[
                (dec!(0), dec!(0.04)),
                (dec!(10000), dec!(0.06)),
                (dec!(40000), dec!(0.065)),
                (dec!(60000), dec!(0.085)),
                (dec!(250000), dec!(0.0925)),
                (dec!(500000), dec!(0.0975)),
                (dec!(1000000), dec!(0.1075)),
            ])?,
        )
        .with_standard_deduction(federal_standard_deduction())
        .with_itemized()
        .with_eitc(dec!(0.70), true),
    ))
}

fn georgia() -> Calculator {
    standard(
        flat("GA", "Georgia", dec!(0.0519))
            .with_standard_deduction(FilingStatusTable::single_joint(dec!(12000), dec!(24000)))
            .with_itemized()
            .with_exemptions(
                ExemptionKind::Deduction,
                FilingStatusTable::uniform(dec!(0)),
                dec!(4000),
            )
            .with_retirement_exclusion(Some(dec!(65000)), Some(65)),
    )
}

fn hawaii() -> Result<Calculator, ConfigError> {
    let single = brackets(&[
        (dec!(0), dec!(0.014)),
        (dec!(9600), dec!(0.032)),
        (dec!(14400), dec!(0.055)),
        (dec!(19200), dec!(0.064)),
        (dec!(24000), dec!(0.068)),
        (dec!(36000), dec!(0.072)),
        (dec!(48000), dec!(0.076)),
        (dec!(125000), dec!(0.079)),
        (dec!(175000), dec!(0.0825)),
        (dec!(225000), dec!(0.09)),
        (dec!(275000), dec!(0.10)),
        (dec!(325000), dec!(0.11)),
    ])?;
    let joint = single.scaled(dec!(2))?;
    let head_of_household = single.scaled(dec!(1.5))?;
    Ok(standard(
        graduated(
            "HI",
            "Hawaii",
            StateTaxSchedule::Graduated(FilingStatusTable::single_joint_hoh(
                single,
                joint,
                head_of_household,
            )),
        )
        .with_standard_deduction(FilingStatusTable::federal(
            dec!(4400),
            dec!(8800),
            dec!(4400),
            dec!(6424),
        ))
        .with_itemized()
        .with_exemptions(ExemptionKind::Deduction, per_filer(dec!(1144)), dec!(1144))
        .with_retirement_exclusion(None, None)
        .adding_back_municipal_interest(),
    ))
}

fn idaho() -> Result<Calculator, ConfigError> {
    Ok(standard(
        graduated(
            "ID",
            "Idaho",
            doubled(&[(dec!(0), dec!(0)), (dec!(4673), dec!(0.053))])?,
        )
        .with_standard_deduction(federal_standard_deduction())
        .with_itemized()
        .with_dependent_credit(dec!(205), false, Some(17)),
    ))
}

fn illinois() -> Calculator {
    standard(
        flat("IL", "Illinois", dec!(0.0495))
            .with_exemptions(ExemptionKind::Deduction, per_filer(dec!(2850)), dec!(2850))
            .with_exemption_phase_out(PhaseOut {
                threshold: FilingStatusTable::single_joint(dec!(250000), dec!(500000)),
                reduction: PhaseOutReduction::Cliff,
            })
            .with_retirement_exclusion(None, None)
            .with_eitc(dec!(0.20), true)
            .adding_back_municipal_interest(),
    )
}

fn indiana() -> Calculator {
    standard(
        flat("IN", "Indiana", dec!(0.03))
            .with_exemptions(ExemptionKind::Deduction, per_filer(dec!(1000)), dec!(1500))
            .with_eitc(dec!(0.10), true)
            .with_local_tax(
                vec![LocalJurisdiction::flat(
                    "Marion County",
                    &["Indianapolis"],
                    LocalTaxBase::StateTaxableIncome,
                    dec!(0.0202),
                )],
                None,
            ),
    )
}

fn iowa() -> Calculator {
    standard(
        flat("IA", "Iowa", dec!(0.038))
            .starting_from(StartingIncome::FederalTaxableIncome)
            .with_exemptions(ExemptionKind::Credit, per_filer(dec!(40)), dec!(40))
            .with_retirement_exclusion(None, Some(55))
            .with_eitc(dec!(0.15), true),
    )
}

fn kansas() -> Result<Calculator, ConfigError> {
    Ok(standard(
        graduated(
            "KS",
            "Kansas",
            doubled(&[(dec!(0), dec!(0.052)), (dec!(23000), dec!(0.0558))])?,
        )
        .with_standard_deduction(FilingStatusTable::federal(
            dec!(3605),
            dec!(8240),
            dec!(4120),
            dec!(6180),
        ))
        .with_itemized()
        .with_exemptions(ExemptionKind::Deduction, per_filer(dec!(9160)), dec!(2320))
        .with_eitc(dec!(0.17), true),
    ))
}

fn kentucky() -> Calculator {
    standard(
        flat("KY", "Kentucky", dec!(0.04))
            .with_standard_deduction(FilingStatusTable::uniform(dec!(3270)))
            .with_itemized()
            .with_retirement_exclusion(Some(dec!(31110)), None)
            .with_local_tax(
                vec![
                    earned_income_local("Louisville Metro", &["Louisville"], dec!(0.022)),
                    earned_income_local("Lexington-Fayette", &["Lexington"], dec!(0.0225)),
                ],
                None,
            ),
    )
}

fn louisiana() -> Calculator {
    standard(
        flat("LA", "Louisiana", dec!(0.03))
            .with_standard_deduction(FilingStatusTable::single_joint(dec!(12500), dec!(25000)))
            .with_retirement_exclusion(Some(dec!(12000)), Some(65)),
    )
}

fn maine() -> Result<Calculator, ConfigError> {
    Ok(standard(
        graduated(
            "ME",
            "Maine",
            single_joint_hoh(
                &[(dec!(0), dec!(0.058)), (dec!(26800), dec!(0.0675)), (dec!(63450), dec!(0.0715))],
                &[(dec!(0), dec!(0.058)), (dec!(53600), dec!(0.0675)), (dec!(126900), dec!(0.0715))],
                &[(dec!(0), dec!(0.058)), (dec!(40200), dec!(0.0675)), (dec!(95150), dec!(0.0715))],
            )?,
        )
        .with_standard_deduction(federal_standard_deduction())
        .with_itemized()
        .with_exemptions(ExemptionKind::Deduction, per_filer(dec!(5150)), dec!(0))
        .with_dependent_credit(dec!(300), true, None)
        .with_retirement_exclusion(Some(dec!(45864)), None)
        .with_eitc(dec!(0.25), true),
    ))
}

fn maryland() -> Result<Calculator, ConfigError> {
    Ok(standard(
        graduated(
            "MD",
            "Maryland",
            single_joint(
                &[
                    (dec!(0), dec!(0.02)),
                    (dec!(1000), dec!(0.03)),
                    (dec!(2000), dec!(0.04)),
                    (dec!(3000), dec!(0.0475)),
                    (dec!(100000), dec!(0.05)),
                    (dec!(125000), dec!(0.0525)),
                    (dec!(150000), dec!(0.055)),
                    (dec!(250000), dec!(0.0575)),
                    (dec!(500000), dec!(0.0625)),
                    (dec!(1000000), dec!(0.065)),
                ],
                &[
                    (dec!(0), dec!(0.02)),
                    (dec!(1000), dec!(0.03)),
                    (dec!(2000), dec!(0.04)),
                    (dec!(3000), dec!(0.0475)),
                    (dec!(150000), dec!(0.05)),
                    (dec!(175000), dec!(0.0525)),
                    (dec!(225000), dec!(0.055)),
                    (dec!(300000), dec!(0.0575)),
                    (dec!(600000), dec!(0.0625)),
                    (dec!(1200000), dec!(0.065)),
                ],
            )?,
        )
        .with_standard_deduction(FilingStatusTable::single_joint(dec!(3350), dec!(6700)))
        .with_itemized()
        .with_exemptions(ExemptionKind::Deduction, per_filer(dec!(3200)), dec!(3200))
        .with_exemption_phase_out(PhaseOut {
            threshold: FilingStatusTable::single_joint(dec!(150000), dec!(200000)),
            reduction: PhaseOutReduction::Cliff,
        })
        .with_retirement_exclusion(Some(dec!(39500)), Some(65))
        .with_eitc(dec!(0.45), false)
        .with_local_tax(
            vec![
                LocalJurisdiction::flat(
                    "Baltimore City",
                    &["Baltimore"],
                    LocalTaxBase::StateTaxableIncome,
                    dec!(0.032),
                ),
                LocalJurisdiction::flat(
                    "Montgomery County",
                    &["Rockville", "Bethesda", "Silver Spring", "Gaithersburg"],
                    LocalTaxBase::StateTaxableIncome,
                    dec!(0.032),
                ),
            ],
            Some(LocalJurisdiction::flat(
                "Maryland county",
                &[],
                LocalTaxBase::StateTaxableIncome,
                dec!(0.03),
            )),
        ),
    ))
}

fn massachusetts() -> Calculator {
    standard(
        flat("MA", "Massachusetts", dec!(0.05))
            // Millionaires tax
            .with_surtax(FilingStatusTable::uniform(dec!(1083150)), dec!(0.04))
            .with_exemptions(
                ExemptionKind::Deduction,
                FilingStatusTable::federal(dec!(4400), dec!(8800), dec!(4400), dec!(6800)),
                dec!(1000),
            )
            .with_dependent_credit(dec!(440), true, Some(13))
            .with_eitc(dec!(0.40), true)
            .adding_back_municipal_interest(),
    )
}

fn michigan() -> Calculator {
    standard(
        flat("MI", "Michigan", dec!(0.0425))
            .with_exemptions(ExemptionKind::Deduction, per_filer(dec!(5800)), dec!(5800))
            .with_retirement_exclusion(Some(dec!(65897)), Some(67))
            .with_eitc(dec!(0.30), true)
            .with_local_tax(
                vec![
                    LocalJurisdiction::flat(
                        "Detroit",
                        &["Detroit"],
                        LocalTaxBase::FederalAgi,
                        dec!(0.024),
                    ),
                    LocalJurisdiction::flat(
                        "Grand Rapids",
                        &["Grand Rapids"],
                        LocalTaxBase::FederalAgi,
                        dec!(0.015),
                    ),
                    LocalJurisdiction::flat(
                        "Lansing",
                        &["Lansing"],
                        LocalTaxBase::FederalAgi,
                        dec!(0.01),
                    ),
                ],
                None,
            ),
    )
}

fn minnesota() -> Result<Calculator, ConfigError> {
    Ok(standard(
        graduated(
            "MN",
            "Minnesota",
            single_joint_hoh(
                &[
                    (dec!(0), dec!(0.0535)),
                    (dec!(32570), dec!(0.068)),
                    (dec!(106990), dec!(0.0785)),
                    (dec!(198630), dec!(0.0985)),
                ],
                &[
                    (dec!(0), dec!(0.0535)),
                    (dec!(47620), dec!(0.068)),
                    (dec!(189180), dec!(0.0785)),
                    (dec!(330410), dec!(0.0985)),
                ],
                &[
                    (dec!(0), dec!(0.0535)),
                    (dec!(40100), dec!(0.068)),
                    (dec!(161130), dec!(0.0785)),
                    (dec!(264050), dec!(0.0985)),
                ],
            )?,
        )
        .with_standard_deduction(FilingStatusTable::federal(
            dec!(14950),
            dec!(29900),
            dec!(14950),
            dec!(22500),
        ))
        .with_standard_deduction_phase_out(PhaseOut {
            threshold: FilingStatusTable::uniform(dec!(238950)),
            reduction: PhaseOutReduction::Rate(dec!(0.03)),
        })
        .with_itemized()
        .with_exemptions(
            ExemptionKind::Deduction,
            FilingStatusTable::uniform(dec!(0)),
            dec!(5200),
        )
        .with_dependent_credit(dec!(1750), true, Some(18)),
    ))
}

fn mississippi() -> Result<Calculator, ConfigError> {
    Ok(standard(
        graduated(
            "MS",
            "Mississippi",
            uniform(&[(dec!(0), dec!(0)), (dec!(10000), dec!(0.044))])?,
        )
        .with_standard_deduction(FilingStatusTable::federal(
            dec!(2300),
            dec!(4600),
            dec!(2300),
            dec!(3400),
        ))
        .with_itemized()
        .with_exemptions(
            ExemptionKind::Deduction,
            FilingStatusTable::federal(dec!(6000), dec!(12000), dec!(6000), dec!(9500)),
            dec!(1500),
        )
        .with_retirement_exclusion(None, None),
    ))
}

fn missouri() -> Result<Calculator, ConfigError> {
    let config = graduated(
        "MO",
        "Missouri",
        uniform(&[
            (dec!(0), dec!(0)),
            (dec!(1313), dec!(0.02)),
            (dec!(2626), dec!(0.025)),
            (dec!(3939), dec!(0.03)),
            (dec!(5252), dec!(0.035)),
            (dec!(6565), dec!(0.04)),
            (dec!(7878), dec!(0.045)),
            (dec!(9191), dec!(0.047)),
        ])?,
    )
    .with_standard_deduction(federal_standard_deduction())
    .with_itemized()
    .with_local_tax(
        vec![
            earned_income_local("Kansas City", &["Kansas City"], dec!(0.01)),
            earned_income_local("St. Louis", &["St. Louis", "Saint Louis"], dec!(0.01)),
        ],
        None,
    );
    Ok(Arc::new(FederalTaxDeductionCalculator::new(
        config,
        FederalTaxDeductionLimit::missouri(),
    )))
}

fn montana() -> Result<Calculator, ConfigError> {
    Ok(standard(
        graduated(
            "MT",
            "Montana",
            single_joint_hoh(
                &[(dec!(0), dec!(0.047)), (dec!(21100), dec!(0.059))],
                &[(dec!(0), dec!(0.047)), (dec!(42200), dec!(0.059))],
                &[(dec!(0), dec!(0.047)), (dec!(31700), dec!(0.059))],
            )?,
        )
        .starting_from(StartingIncome::FederalTaxableIncome)
        .with_eitc(dec!(0.10), true),
    ))
}

fn nebraska() -> Result<Calculator, ConfigError> {
    Ok(standard(
        graduated(
            "NE",
            "Nebraska",
            single_joint(
                &[
                    (dec!(0), dec!(0.0246)),
                    (dec!(4030), dec!(0.0351)),
                    (dec!(24120), dec!(0.0501)),
                    (dec!(38870), dec!(0.052)),
                ],
                &[
                    (dec!(0), dec!(0.0246)),
                    (dec!(8040), dec!(0.0351)),
                    (dec!(48250), dec!(0.0501)),
                    (dec!(77730), dec!(0.052)),
                ],
            )?,
        )
        .with_standard_deduction(FilingStatusTable::federal(
            dec!(8600),
            dec!(17200),
            dec!(8600),
            dec!(12600),
        ))
        .with_itemized()
        .with_exemptions(ExemptionKind::Credit, per_filer(dec!(171)), dec!(171))
        .with_eitc(dec!(0.10), true),
    ))
}

fn new_jersey() -> Result<Calculator, ConfigError> {
    Ok(standard(
        graduated(
            "NJ",
            "New Jersey",
            single_joint(
                &[
                    (dec!(0), dec!(0.014)),
                    (dec!(20000), dec!(0.0175)),
                    (dec!(35000), dec!(0.035)),
                    (dec!(40000), dec!(0.05525)),
                    (dec!(75000), dec!(0.0637)),
                    (dec!(500000), dec!(0.0897)),
                    (dec!(1000000), dec!(0.1075)),
                ],
                &[
                    (dec!(0), dec!(0.014)),
                    (dec!(20000), dec!(0.0175)),
                    (dec!(50000), dec!(0.0245)),
                    (dec!(70000), dec!(0.035)),
                    (dec!(80000), dec!(0.05525)),
                    (dec!(150000), dec!(0.0637)),
                    (dec!(500000), dec!(0.0897)),
                    (dec!(1000000), dec!(0.1075)),
                ],
            )?,
        )
        .starting_from(StartingIncome::GrossIncome)
        .with_exemptions(ExemptionKind::Deduction, per_filer(dec!(1000)), dec!(1500))
        .with_dependent_credit(dec!(500), true, Some(6))
        .with_retirement_exclusion(Some(dec!(50000)), Some(62))
        .with_eitc(dec!(0.40), true)
        .adding_back_municipal_interest(),
    ))
}

fn new_mexico() -> Result<Calculator, ConfigError> {
    Ok(standard(
        graduated(
            "NM",
            "New Mexico",
            single_joint(
                &[
                    (dec!(0), dec!(0.015)),
                    (dec!(5500), dec!(0.032)),
                    (dec!(16500), dec!(0.043)),
                    (dec!(33500), dec!(0.047)),
                    (dec!(66500), dec!(0.049)),
                    (dec!(210000), dec!(0.059)),
                ],
                &[
                    (dec!(0), dec!(0.015)),
                    (dec!(8000), dec!(0.032)),
                    (dec!(25000), dec!(0.043)),
                    (dec!(50000), dec!(0.047)),
                    (dec!(100000), dec!(0.049)),
                    (dec!(315000), dec!(0.059)),
                ],
            )?,
        )
        .with_standard_deduction(federal_standard_deduction())
        .with_itemized()
        .with_exemptions(
            ExemptionKind::Deduction,
            FilingStatusTable::uniform(dec!(0)),
            dec!(4000),
        )
        .with_eitc(dec!(0.25), true)
        .adding_back_municipal_interest(),
    ))
}

fn new_york() -> Result<Calculator, ConfigError> {
    let new_york_city = LocalJurisdiction {
        name: "New York City".to_string(),
        cities: [
            "NEW YORK",
            "NEW YORK CITY",
            "NYC",
            "MANHATTAN",
            "BROOKLYN",
            "BRONX",
            "QUEENS",
            "STATEN ISLAND",
        ]
        .into_iter()
        .map(str::to_string)
        .collect(),
        base: LocalTaxBase::StateTaxableIncome,
        schedule: LocalSchedule::Graduated(FilingStatusTable::single_joint_hoh(
            brackets(&[
                (dec!(0), dec!(0.03078)),
                (dec!(12000), dec!(0.03762)),
                (dec!(25000), dec!(0.03819)),
                (dec!(50000), dec!(0.03876)),
            ])?,
            brackets(&[
                (dec!(0), dec!(0.03078)),
                (dec!(21600), dec!(0.03762)),
                (dec!(45000), dec!(0.03819)),
                (dec!(90000), dec!(0.03876)),
            ])?,
            brackets(&[
                (dec!(0), dec!(0.03078)),
                (dec!(14400), dec!(0.03762)),
                (dec!(30000), dec!(0.03819)),
                (dec!(60000), dec!(0.03876)),
            ])?,
        )),
    };

    Ok(standard(
        graduated(
            "NY",
            "New York",
            single_joint_hoh(
                &[
                    (dec!(0), dec!(0.04)),
                    (dec!(8500), dec!(0.045)),
                    (dec!(11700), dec!(0.0525)),
                    (dec!(13900), dec!(0.055)),
                    (dec!(80650), dec!(0.06)),
                    (dec!(215400), dec!(0.0685)),
                    (dec!(1077550), dec!(0.0965)),
                    (dec!(5000000), dec!(0.103)),
                    (dec!(25000000), dec!(0.109)),
                ],
                &[
                    (dec!(0), dec!(0.04)),
                    (dec!(17150), dec!(0.045)),
                    (dec!(23600), dec!(0.0525)),
                    (dec!(27900), dec!(0.055)),
                    (dec!(161550), dec!(0.06)),
                    (dec!(323200), dec!(0.0685)),
                    (dec!(2155350), dec!(0.0965)),
                    (dec!(5000000), dec!(0.103)),
                    (dec!(25000000), dec!(0.109)),
                ],
                &[
                    (dec!(0), dec!(0.04)),
                    (dec!(12800), dec!(0.045)),
                    (dec!(17650), dec!(0.0525)),
                    (dec!(20900), dec!(0.055)),
                    (dec!(107650), dec!(0.06)),
                    (dec!(269300), dec!(0.0685)),
                    (dec!(1616450), dec!(0.0965)),
                    (dec!(5000000), dec!(0.103)),
                    (dec!(25000000), dec!(0.109)),
                ],
            )?,
        )
        .with_standard_deduction(FilingStatusTable::federal(
            dec!(8000),
            dec!(16050),
            dec!(8000),
            dec!(11200),
        ))
        .with_itemized()
        .with_exemptions(
            ExemptionKind::Deduction,
            FilingStatusTable::uniform(dec!(0)),
            dec!(1000),
        )
        .with_retirement_exclusion(Some(dec!(20000)), Some(59))
        .with_eitc(dec!(0.30), true)
        .adding_back_municipal_interest()
        .with_local_tax(vec![new_york_city], None),
    ))
}

fn north_carolina() -> Calculator {
    standard(
        flat("NC", "North Carolina", dec!(0.0425))
            .with_standard_deduction(FilingStatusTable::federal(
                dec!(12750),
                dec!(25500),
                dec!(12750),
                dec!(19125),
            ))
            .with_itemized(),
    )
}

fn north_dakota() -> Result<Calculator, ConfigError> {
    Ok(standard(
        graduated(
            "ND",
            "North Dakota",
            single_joint_hoh(
                &[(dec!(0), dec!(0)), (dec!(48475), dec!(0.0195)), (dec!(244825), dec!(0.025))],
                &[(dec!(0), dec!(0)), (dec!(80975), dec!(0.0195)), (dec!(298075), dec!(0.025))],
                &[(dec!(0), dec!(0)), (dec!(64950), dec!(0.0195)), (dec!(271450), dec!(0.025))],
            )?,
        )
        .starting_from(StartingIncome::FederalTaxableIncome),
    ))
}

fn ohio() -> Result<Calculator, ConfigError> {
    Ok(standard(
        graduated(
            "OH",
            "Ohio",
            uniform(&[
                (dec!(0), dec!(0)),
                (dec!(26050), dec!(0.0275)),
                (dec!(100000), dec!(0.03125)),
            ])?,
        )
        .with_exemptions(ExemptionKind::Deduction, per_filer(dec!(2400)), dec!(2400))
        .with_exemption_phase_out(PhaseOut {
            threshold: FilingStatusTable::uniform(dec!(750000)),
            reduction: PhaseOutReduction::Cliff,
        })
        .with_local_tax(
            vec![
                earned_income_local("Columbus", &["Columbus"], dec!(0.025)),
                earned_income_local("Cleveland", &["Cleveland"], dec!(0.025)),
                earned_income_local("Cincinnati", &["Cincinnati"], dec!(0.018)),
                earned_income_local("Toledo", &["Toledo"], dec!(0.025)),
                earned_income_local("Akron", &["Akron"], dec!(0.025)),
                earned_income_local("Dayton", &["Dayton"], dec!(0.025)),
            ],
            None,
        ),
    ))
}

fn oklahoma() -> Result<Calculator, ConfigError> {
    Ok(standard(
        graduated(
            "OK",
            "Oklahoma",
            doubled(&[
                (dec!(0), dec!(0.0025)),
                (dec!(1000), dec!(0.0075)),
                (dec!(2500), dec!(0.0175)),
                (dec!(3750), dec!(0.0275)),
                (dec!(4900), dec!(0.0375)),
                (dec!(7200), dec!(0.0475)),
            ])?,
        )
        .with_standard_deduction(FilingStatusTable::federal(
            dec!(6350),
            dec!(12700),
            dec!(6350),
            dec!(9350),
        ))
        .with_itemized()
        .with_exemptions(ExemptionKind::Deduction, per_filer(dec!(1000)), dec!(1000))
        .with_retirement_exclusion(Some(dec!(10000)), None)
        .with_eitc(dec!(0.05), true),
    ))
}

fn oregon() -> Result<Calculator, ConfigError> {
    // Metro supportive housing services and Multnomah preschool taxes
    let portland = LocalJurisdiction {
        name: "Portland metro".to_string(),
        cities: vec!["PORTLAND".to_string()],
        base: LocalTaxBase::StateTaxableIncome,
        schedule: LocalSchedule::Graduated(FilingStatusTable::single_joint(
            brackets(&[
                (dec!(0), dec!(0)),
                (dec!(125000), dec!(0.025)),
                (dec!(250000), dec!(0.04)),
            ])?,
            brackets(&[
                (dec!(0), dec!(0)),
                (dec!(200000), dec!(0.025)),
                (dec!(400000), dec!(0.04)),
            ])?,
        )),
    };

    let config = graduated(
        "OR",
        "Oregon",
        single_joint(
            &[
                (dec!(0), dec!(0.0475)),
                (dec!(4400), dec!(0.0675)),
                (dec!(11050), dec!(0.0875)),
                (dec!(125000), dec!(0.099)),
            ],
            &[
                (dec!(0), dec!(0.0475)),
                (dec!(8800), dec!(0.0675)),
                (dec!(22100), dec!(0.0875)),
                (dec!(250000), dec!(0.099)),
            ],
        )?,
    )
    .with_standard_deduction(FilingStatusTable::federal(
        dec!(2835),
        dec!(5670),
        dec!(2835),
        dec!(4560),
    ))
    .with_itemized()
    .with_exemptions(ExemptionKind::Credit, per_filer(dec!(256)), dec!(256))
    .with_exemption_phase_out(PhaseOut {
        threshold: FilingStatusTable::single_joint(dec!(100000), dec!(200000)),
        reduction: PhaseOutReduction::Cliff,
    })
    .with_eitc(dec!(0.09), true)
    .with_local_tax(vec![portland], None);
    Ok(Arc::new(FederalTaxDeductionCalculator::new(
        config,
        FederalTaxDeductionLimit::oregon(),
    )))
}

fn pennsylvania() -> Calculator {
    standard(
        flat("PA", "Pennsylvania", dec!(0.0307))
            .starting_from(StartingIncome::GrossIncome)
            .with_retirement_exclusion(None, None)
            .with_local_tax(
                vec![
                    earned_income_local("Philadelphia", &["Philadelphia"], dec!(0.0374)),
                    earned_income_local("Pittsburgh", &["Pittsburgh"], dec!(0.03)),
                    earned_income_local("Scranton", &["Scranton"], dec!(0.034)),
                ],
                Some(earned_income_local("Pennsylvania municipality", &[], dec!(0.01))),
            ),
    )
}

fn rhode_island() -> Result<Calculator, ConfigError> {
    let phase_out = PhaseOut {
        threshold: FilingStatusTable::uniform(dec!(254250)),
        reduction: PhaseOutReduction::PercentPerStep {
            step: dec!(5910),
            percent: dec!(0.20),
        },
    };
    Ok(standard(
        graduated(
            "RI",
            "Rhode Island",
            uniform(&[
                (dec!(0), dec!(0.0375)),
                (dec!(79900), dec!(0.0475)),
                (dec!(181650), dec!(0.0599)),
            ])?,
        )
        .with_standard_deduction(FilingStatusTable::federal(
            dec!(10900),
            dec!(21800),
            dec!(10900),
            dec!(16350),
        ))
        .with_standard_deduction_phase_out(phase_out.clone())
        .with_exemptions(ExemptionKind::Deduction, per_filer(dec!(5100)), dec!(5100))
        .with_exemption_phase_out(phase_out)
        .with_eitc(dec!(0.16), true),
    ))
}

fn south_carolina() -> Result<Calculator, ConfigError> {
    Ok(standard(
        graduated(
            "SC",
            "South Carolina",
            uniform(&[
                (dec!(0), dec!(0)),
                (dec!(3560), dec!(0.03)),
                (dec!(17830), dec!(0.06)),
            ])?,
        )
        .starting_from(StartingIncome::FederalTaxableIncome)
        .with_retirement_exclusion(Some(dec!(10000)), Some(65))
        .with_eitc(dec!(1.25), false),
    ))
}

fn utah() -> Calculator {
    // Taxpayer tax credit: 6% of the federal standard deduction plus
    // dependent exemptions, reduced 1.3 cents per dollar above the base.
    standard(
        flat("UT", "Utah", dec!(0.045))
            .with_exemptions(
                ExemptionKind::Credit,
                FilingStatusTable::federal(dec!(945), dec!(1890), dec!(945), dec!(1417.50)),
                dec!(126.66),
            )
            .with_exemption_phase_out(PhaseOut {
                threshold: FilingStatusTable::federal(
                    dec!(18213),
                    dec!(36426),
                    dec!(18213),
                    dec!(27320),
                ),
                reduction: PhaseOutReduction::Rate(dec!(0.013)),
            })
            .with_eitc(dec!(0.20), false),
    )
}

fn vermont() -> Result<Calculator, ConfigError> {
    Ok(standard(
        graduated(
            "VT",
            "Vermont",
            single_joint_hoh(
                &[
                    (dec!(0), dec!(0.0335)),
                    (dec!(47900), dec!(0.066)),
                    (dec!(116000), dec!(0.076)),
                    (dec!(242000), dec!(0.0875)),
                ],
                &[
                    (dec!(0), dec!(0.0335)),
                    (dec!(79950), dec!(0.066)),
                    (dec!(193300), dec!(0.076)),
                    (dec!(294600), dec!(0.0875)),
                ],
                &[
                    (dec!(0), dec!(0.0335)),
                    (dec!(64200), dec!(0.066)),
                    (dec!(165700), dec!(0.076)),
                    (dec!(268300), dec!(0.0875)),
                ],
            )?,
        )
        .with_standard_deduction(FilingStatusTable::federal(
            dec!(7400),
            dec!(14850),
            dec!(7400),
            dec!(11100),
        ))
        .with_exemptions(ExemptionKind::Deduction, per_filer(dec!(5300)), dec!(5300))
        .with_eitc(dec!(0.38), true)
        .adding_back_municipal_interest(),
    ))
}

fn virginia() -> Result<Calculator, ConfigError> {
    Ok(standard(
        graduated(
            "VA",
            "Virginia",
            uniform(&[
                (dec!(0), dec!(0.02)),
                (dec!(3000), dec!(0.03)),
                (dec!(5000), dec!(0.05)),
                (dec!(17000), dec!(0.0575)),
            ])?,
        )
        .with_standard_deduction(FilingStatusTable::single_joint(dec!(8750), dec!(17500)))
        .with_itemized()
        .with_exemptions(ExemptionKind::Deduction, per_filer(dec!(930)), dec!(930))
        .with_retirement_exclusion(Some(dec!(12000)), Some(65))
        .with_eitc(dec!(0.15), true),
    ))
}

fn west_virginia() -> Result<Calculator, ConfigError> {
    Ok(standard(
        graduated(
            "WV",
            "West Virginia",
            uniform(&[
                (dec!(0), dec!(0.0222)),
                (dec!(10000), dec!(0.0296)),
                (dec!(25000), dec!(0.0333)),
                (dec!(40000), dec!(0.0444)),
                (dec!(60000), dec!(0.0482)),
            ])?,
        )
        .with_exemptions(ExemptionKind::Deduction, per_filer(dec!(2000)), dec!(2000)),
    ))
}

fn wisconsin() -> Result<Calculator, ConfigError> {
    Ok(standard(
        graduated(
            "WI",
            "Wisconsin",
            single_joint(
                &[
                    (dec!(0), dec!(0.035)),
                    (dec!(14680), dec!(0.044)),
                    (dec!(29370), dec!(0.053)),
                    (dec!(323290), dec!(0.0765)),
                ],
                &[
                    (dec!(0), dec!(0.035)),
                    (dec!(19580), dec!(0.044)),
                    (dec!(39150), dec!(0.053)),
                    (dec!(431060), dec!(0.0765)),
                ],
            )?,
        )
        // Sliding-scale standard deduction
        .with_standard_deduction(FilingStatusTable::federal(
            dec!(13560),
            dec!(25110),
            dec!(11920),
            dec!(17500),
        ))
        .with_standard_deduction_phase_out(PhaseOut {
            threshold: FilingStatusTable::federal(
                dec!(19600),
                dec!(28240),
                dec!(13420),
                dec!(19600),
            ),
            reduction: PhaseOutReduction::Rate(dec!(0.12)),
        })
        .with_exemptions(ExemptionKind::Deduction, per_filer(dec!(700)), dec!(700))
        .with_retirement_exclusion(Some(dec!(5000)), Some(65))
        .with_eitc(dec!(0.04), true),
    ))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::FilingStatus;

    fn by_code() -> Vec<(String, Calculator)> {
        calculators()
            .expect("2025 state data is valid")
            .into_iter()
            .map(|c| (c.config().state_code.clone(), c))
            .collect()
    }

    fn find(code: &str) -> Calculator {
        by_code()
            .into_iter()
            .find(|(c, _)| c == code)
            .map(|(_, calculator)| calculator)
            .expect("state present")
    }

    #[test]
    fn fifty_one_unique_jurisdictions() {
        let codes: BTreeSet<String> = by_code().into_iter().map(|(code, _)| code).collect();

        assert_eq!(codes.len(), 51);
    }

    #[test]
    fn every_config_validates_and_is_for_2025() {
        for (code, calculator) in by_code() {
            let config = calculator.config();
            assert_eq!(config.tax_year, 2025, "{code}");
            assert_eq!(config.validate(), Ok(()), "{code}");
        }
    }

    #[test]
    fn no_income_tax_states() {
        let expected: BTreeSet<String> = ["AK", "FL", "NH", "NV", "SD", "TN", "TX", "WA", "WY"]
            .into_iter()
            .map(str::to_string)
            .collect();

        let actual: BTreeSet<String> = by_code()
            .into_iter()
            .filter(|(_, c)| !c.config().has_income_tax())
            .map(|(code, _)| code)
            .collect();

        assert_eq!(actual, expected);
    }

    #[test]
    fn flat_tax_states_are_declared_flat() {
        for code in ["AZ", "CO", "GA", "IL", "IN", "IA", "KY", "LA", "MA", "MI", "NC", "PA", "UT"] {
            assert!(find(code).config().is_flat_tax(), "{code}");
        }
    }

    #[test]
    fn california_top_rate_with_surtax() {
        let california = find("CA");

        let marginal = california.calculate_brackets(dec!(2000001), FilingStatus::Single)
            - california.calculate_brackets(dec!(2000000), FilingStatus::Single);

        assert_eq!(marginal, dec!(0.133));
    }
}
