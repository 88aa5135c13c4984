//! Species catalog
//!
//! Maps organism names to the MLST database codes the typer understands.
//! This is the only copy of the table; every command goes through
//! [`Catalog`].

use crate::SeqtyperError;

/// Organism name to comma-separated database codes.
static BUILTIN_SPECIES: &[(&str, &str)] = &[
    ("Achromobacter", "achromobacter"),
    ("Acinetobacter baumannii", "abaumannii, abaumannii_2"),
    ("Aeromonas", "aeromonas"),
    ("Aggregatibacter actinomycetemcomitans", "aactinomycetemcomitans"),
    ("Anaplasma phagocytophilum", "aphagocytophilum"),
    ("Arcobacter", "arcobacter"),
    ("Aspergillus fumigatus", "afumigatus"),
    ("Bacillus cereus", "bcereus"),
    ("Bacillus licheniformis", "blicheniformis"),
    ("Bacillus subtilis", "bsubtilis"),
    ("Bacteroides fragilis", "bfragilis"),
    ("Bartonella bacilliformis", "bbacilliformis"),
    ("Bartonella henselae", "bhenselae"),
    ("Bartonella washoensis", "bwashoensis"),
    ("Bordetella", "bordetella"),
    ("Borrelia", "borrelia"),
    ("Brachyspira", "brachyspira"),
    ("Brachyspira hampsonii", "bhampsonii"),
    ("Brachyspira hyodysenteriae", "bhyodysenteriae"),
    ("Brachyspira pilosicoli", "bpilosicoli"),
    ("Brucella", "brucella"),
    ("Brucella intermedia", "bintermedia"),
    ("Burkholderia cepacia", "bcepacia"),
    ("Burkholderia pseudomallei", "bpseudomallei"),
    ("Campylobacter concisus", "cconcisus"),
    ("Campylobacter fetus", "cfetus"),
    ("Campylobacter helveticus", "chelveticus"),
    ("Campylobacter hyointestinalis", "chyointestinalis"),
    ("Campylobacter insulaenigrae", "cinsulaenigrae"),
    ("Campylobacter jejuni", "cjejuni"),
    ("Campylobacter lanienae", "clanienae"),
    ("Campylobacter lari", "clari"),
    ("Campylobacter sputorum", "csputorum"),
    ("Campylobacter upsaliensis", "cupsaliensis"),
    ("Candida albicans", "calbicans"),
    ("Candida glabrata", "cglabrata"),
    ("Candida krusei", "ckrusei"),
    ("Candida tropicalis", "ctropicalis"),
    ("Candidatus liberibacter", "cliberibacter"),
    ("Carnobacterium maltaromaticum", "cmaltaromaticum"),
    ("Chlamydiales", "chlamydiales"),
    ("Citrobacter freundii", "cfreundii"),
    ("Clonorchis sinensis", "csinensis"),
    ("Clostridium botulinum", "cbotulinum"),
    ("Clostridium difficile", "cdifficile"),
    ("Clostridium perfringens", "cperfringens"),
    ("Clostridium septicum", "csepticum"),
    ("Corynebacterium diphtheriae", "cdiphtheriae"),
    ("Cronobacter", "cronobacter"),
    ("Cutibacterium acnes", "cacnes"),
    ("Dichelobacter nodosus", "dnodosus"),
    ("Edwardsiella", "edwardsiella"),
    ("Enterobacter cloacae", "ecloacae"),
    ("Enterococcus faecalis", "efaecalis"),
    ("Enterococcus faecium", "efaecium"),
    ("Escherichia coli", "ecoli, ecoli_2"),
    ("Flavobacterium psychrophilum", "fpsychrophilum"),
    ("Gallibacterium anatis", "ganatis"),
    ("Geotrichum", "geotrichum"),
    ("Glaesserella parasuis", "gparasuis"),
    ("Haemophilus influenzae", "hinfluenzae"),
    ("Helicobacter cinaedi", "hcinaedi"),
    ("Helicobacter pylori", "hpylori"),
    ("Helicobacter suis", "hsuis"),
    ("Kingella kingae", "kkingae"),
    ("Klebsiella aerogenes", "kaerogenes"),
    ("Klebsiella oxytoca", "koxytoca"),
    ("Klebsiella pneumoniae", "kpneumoniae"),
    ("Kudoa septempunctata", "kseptempunctata"),
    ("Lactococcus lactis", "llactis"),
    ("Leptospira", "leptospira, leptospira_2, leptospira_3"),
    ("Ligilactobacillus salivarius", "lsalivarius"),
    ("Listeria monocytogenes", "lmonocytogenes"),
    ("Macrococcus caseolyticus", "mcaseolyticus"),
    ("Mammaliicoccus sciuri", "msciuri"),
    ("Mannheimia haemolytica", "mhaemolytica"),
    ("Melissococcus plutonius", "mplutonius"),
    ("Microsporum canis", "mcanis"),
    ("Moraxella catarrhalis", "mcatarrhalis"),
    ("Mycobacteria", "mycobacteria"),
    ("Mycobacterium bovis", "mbovis"),
    ("Mycobacterium massiliense", "mmassiliense"),
    ("Mycobacteroides abscessus", "mabscessus"),
    ("Mycoplasma agalactiae", "magalactiae"),
    ("Mycoplasma anserisalpingitidis", "manserisalpingitidis"),
    ("Mycoplasma flocculare", "mflocculare"),
    ("Mycoplasma gallisepticum", "mgallisepticum, mgallisepticum_2"),
    ("Mycoplasma hominis", "mhominis"),
    ("Mycoplasma hyopneumoniae", "mhyopneumoniae"),
    ("Mycoplasma hyorhinis", "mhyorhinis"),
    ("Mycoplasma iowae", "miowae"),
    ("Mycoplasma pneumoniae", "mpneumoniae"),
    ("Mycoplasma synoviae", "msynoviae"),
    ("Neisseria", "neisseria"),
    ("Orientia tsutsugamushi", "otsutsugamushi"),
    ("Ornithobacterium rhinotracheale", "orhinotracheale"),
    ("Paenibacillus larvae", "plarvae"),
    ("Pasteurella multocida", "pmultocida, pmultocida_2"),
    ("Pediococcus pentosaceus", "ppentosaceus"),
    ("Photobacterium damselae", "pdamselae"),
    ("Piscirickettsia salmonis", "psalmonis"),
    ("Porphyromonas gingivalis", "pgingivalis"),
    ("Propionibacterium acnes", "pacnes"),
    ("Pseudomonas aeruginosa", "paeruginosa"),
    ("Pseudomonas fluorescens", "pfluorescens"),
    ("Pseudomonas putida", "pputida"),
    ("Rhodococcus", "rhodococcus"),
    ("Riemerella anatipestifer", "ranatipestifer"),
    ("Salmonella enterica", "senterica"),
    ("Shewanella", "shewanella"),
    ("Sinorhizobium", "sinorhizobium"),
    ("Staphylococcus aureus", "saureus"),
    ("Staphylococcus chromogenes", "schromogenes"),
    ("Staphylococcus epidermidis", "sepidermidis"),
    ("Staphylococcus haemolyticus", "shaemolyticus"),
    ("Staphylococcus hominis", "shominis"),
    ("Staphylococcus lugdunensis", "slugdunensis"),
    ("Staphylococcus pseudintermedius", "spseudintermedius"),
    ("Stenotrophomonas maltophilia", "smaltophilia"),
    ("Streptococcus agalactiae", "sagalactiae"),
    ("Streptococcus bovis", "sbovis"),
    ("Streptococcus canis", "scanis"),
    ("Streptococcus dysgalactiae", "sdysgalactiae"),
    ("Streptococcus gallolyticus", "sgallolyticus"),
    ("Streptococcus oralis", "soralis"),
    ("Streptococcus pneumoniae", "spneumoniae"),
    ("Streptococcus pyogenes", "spyogenes"),
    ("Streptococcus suis", "ssuis"),
    ("Streptococcus thermophilus", "sthermophilus, sthermophilus_2"),
    ("Streptococcus uberis", "suberis"),
    ("Streptococcus zooepidemicus", "szooepidemicus"),
    ("Streptomyces", "streptomyces"),
    ("Syspastospora parasitica", "sparasitica"),
    ("Taylorella", "taylorella"),
    ("Tenacibaculum", "tenacibaculum"),
    ("Treponema pallidum", "tpallidum"),
    ("Trichomonas vaginalis", "tvaginalis"),
    ("Ureaplasma", "ureaplasma"),
    ("Vibrio", "vibrio"),
    ("Vibrio cholerae", "vcholerae, vcholerae_2"),
    ("Vibrio parahaemolyticus", "vparahaemolyticus"),
    ("Vibrio tapetis", "vtapetis"),
    ("Vibrio vulnificus", "vvulnificus"),
    ("Wolbachia", "wolbachia"),
    ("Xylella fastidiosa", "xfastidiosa"),
    ("Yersinia pseudotuberculosis", "ypseudotuberculosis"),
    ("Yersinia ruckeri", "yruckeri"),
];

/// Read-only view over a species table
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    entries: &'static [(&'static str, &'static str)],
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// The catalog shipped with seqtyper
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_SPECIES,
        }
    }

    pub fn from_entries(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    /// A code is valid only if it equals one of the comma-separated tokens
    /// of some entry. Substrings of a token do not count.
    pub fn is_valid(&self, code: &str) -> bool {
        self.lookup(code).is_some()
    }

    /// Organism name for a database code
    pub fn lookup(&self, code: &str) -> Option<&'static str> {
        let code = code.trim();
        if code.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|(_, codes)| split_codes(*codes).any(|token| token == code))
            .map(|(name, _)| *name)
    }

    /// Like [`Catalog::lookup`] but fails with `InvalidSpecies`
    pub fn validate(&self, code: &str) -> Result<&'static str, SeqtyperError> {
        self.lookup(code)
            .ok_or_else(|| SeqtyperError::InvalidSpecies(code.to_string()))
    }

    /// All entries sorted by organism name, codes split into tokens
    pub fn list_options(&self) -> Vec<(&'static str, Vec<&'static str>)> {
        let mut options: Vec<_> = self
            .entries
            .iter()
            .map(|(name, codes)| (*name, split_codes(*codes).collect()))
            .collect();
        options.sort_by(|a, b| a.0.cmp(b.0));
        options
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn split_codes(codes: &'static str) -> impl Iterator<Item = &'static str> {
    codes.split(',').map(str::trim).filter(|token| !token.is_empty())
}
