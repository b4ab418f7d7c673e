//! Hard-coded reference assembly catalogues.
//!
//! Each entry is `(name, length, refget MD5)` in assembly order: assembled
//! chromosomes first, then unlocalized scaffolds, unplaced scaffolds, and the
//! EBV decoy. Digests are carried for the assembled chromosomes; scaffold
//! rows insert a NULL refget id.

/// GRCh38 "no alt analysis set" (GCA_000001405.15): 195 sequences.
pub(crate) const GRCH38_NO_ALT_ANALYSIS_SET: &[(&str, i64, Option<&str>)] = &[
    ("chr1", 248956422, Some("6aef897c3d6ff0c78aff06ac189178dd")),
    ("chr2", 242193529, Some("f98db672eb0993dcfdabafe2a882905c")),
    ("chr3", 198295559, Some("76635a41ea913a405ded820447d067b0")),
    ("chr4", 190214555, Some("3210fecf1eb92d5489da4346b3fddc6e")),
    ("chr5", 181538259, Some("a811b3dc9fe66af729dc0dddf7fa4f13")),
    ("chr6", 170805979, Some("5691468a67c7e7a7b5f2a3a683792c29")),
    ("chr7", 159345973, Some("cc044cc2256a1141212660fb07b6171e")),
    ("chr8", 145138636, Some("c67955b5f7815a9a1edfaa15893d3616")),
    ("chr9", 138394717, Some("6c198acf68b5af7b9d676dfdd531b5de")),
    ("chr10", 133797422, Some("c0eeee7acfdaf31b770a509bdaa6e51a")),
    ("chr11", 135086622, Some("1511375dc2dd1b633af8cf439ae90cec")),
    ("chr12", 133275309, Some("96e414eace405d8c27a6d35ba19df56f")),
    ("chr13", 114364328, Some("a5437debe2ef9c9ef8f3ea2874ae1d82")),
    ("chr14", 107043718, Some("e0f0eecc3bcab6178c62b6211565c807")),
    ("chr15", 101991189, Some("f036bd11158407596ca6bf3581454706")),
    ("chr16", 90338345, Some("db2d37c8b7d019caaf2dd64ba3a6f33a")),
    ("chr17", 83257441, Some("f9a0fb01553adb183568e3eb9d8626db")),
    ("chr18", 80373285, Some("11eeaa801f6b0e2e36a1138616b8ee9a")),
    ("chr19", 58617616, Some("85f9f4fc152c58cb7913c06d6b98573a")),
    ("chr20", 64444167, Some("b18e6c531b0bd70e949a7fc20859cb01")),
    ("chr21", 46709983, Some("974dc7aec0b755b19f031418fdedf293")),
    ("chr22", 50818468, Some("ac37ec46683600f808cdd41eac1d55cd")),
    ("chrX", 156040895, Some("2b3a55ff7f58eb308420c8a9b11cac50")),
    ("chrY", 57227415, Some("ce3e31103314a704255f3cd90369ecce")),
    ("chrM", 16569, Some("c68f52674c9fb33aef52dcf399755519")),
    ("chr1_KI270706v1_random", 175055, None),
    ("chr1_KI270707v1_random", 32032, None),
    ("chr1_KI270708v1_random", 127682, None),
    ("chr1_KI270709v1_random", 66860, None),
    ("chr1_KI270710v1_random", 40176, None),
    ("chr1_KI270711v1_random", 42210, None),
    ("chr1_KI270712v1_random", 176043, None),
    ("chr1_KI270713v1_random", 40745, None),
    ("chr1_KI270714v1_random", 41717, None),
    ("chr2_KI270715v1_random", 161471, None),
    ("chr2_KI270716v1_random", 153799, None),
    ("chr3_GL000221v1_random", 155397, None),
    ("chr4_GL000008v2_random", 209709, None),
    ("chr5_GL000208v1_random", 92689, None),
    ("chr9_KI270717v1_random", 40062, None),
    ("chr9_KI270718v1_random", 38054, None),
    ("chr9_KI270719v1_random", 176845, None),
    ("chr9_KI270720v1_random", 39050, None),
    ("chr11_KI270721v1_random", 100316, None),
    ("chr14_GL000009v2_random", 201709, None),
    ("chr14_GL000225v1_random", 211173, None),
    ("chr14_KI270722v1_random", 194050, None),
    ("chr14_GL000194v1_random", 191469, None),
    ("chr14_KI270723v1_random", 38115, None),
    ("chr14_KI270724v1_random", 39555, None),
    ("chr14_KI270725v1_random", 172810, None),
    ("chr14_KI270726v1_random", 43739, None),
    ("chr15_KI270727v1_random", 448248, None),
    ("chr16_KI270728v1_random", 1872759, None),
    ("chr17_GL000205v2_random", 185591, None),
    ("chr17_KI270729v1_random", 280839, None),
    ("chr17_KI270730v1_random", 112551, None),
    ("chr22_KI270731v1_random", 150754, None),
    ("chr22_KI270732v1_random", 41543, None),
    ("chr22_KI270733v1_random", 179772, None),
    ("chr22_KI270734v1_random", 165050, None),
    ("chr22_KI270735v1_random", 42811, None),
    ("chr22_KI270736v1_random", 181920, None),
    ("chr22_KI270737v1_random", 103838, None),
    ("chr22_KI270738v1_random", 99375, None),
    ("chr22_KI270739v1_random", 73985, None),
    ("chrY_KI270740v1_random", 37240, None),
    ("chrUn_KI270302v1", 2274, None),
    ("chrUn_KI270304v1", 2165, None),
    ("chrUn_KI270303v1", 1942, None),
    ("chrUn_KI270305v1", 1472, None),
    ("chrUn_KI270322v1", 21476, None),
    ("chrUn_KI270320v1", 4416, None),
    ("chrUn_KI270310v1", 1201, None),
    ("chrUn_KI270316v1", 1444, None),
    ("chrUn_KI270315v1", 2276, None),
    ("chrUn_KI270312v1", 998, None),
    ("chrUn_KI270311v1", 12399, None),
    ("chrUn_KI270317v1", 37690, None),
    ("chrUn_KI270412v1", 1179, None),
    ("chrUn_KI270411v1", 2646, None),
    ("chrUn_KI270414v1", 2489, None),
    ("chrUn_KI270419v1", 1029, None),
    ("chrUn_KI270418v1", 2145, None),
    ("chrUn_KI270420v1", 2321, None),
    ("chrUn_KI270424v1", 2140, None),
    ("chrUn_KI270417v1", 2043, None),
    ("chrUn_KI270422v1", 1445, None),
    ("chrUn_KI270423v1", 981, None),
    ("chrUn_KI270425v1", 1884, None),
    ("chrUn_KI270429v1", 1361, None),
    ("chrUn_KI270442v1", 392061, None),
    ("chrUn_KI270466v1", 1233, None),
    ("chrUn_KI270465v1", 1774, None),
    ("chrUn_KI270467v1", 3920, None),
    ("chrUn_KI270435v1", 92983, None),
    ("chrUn_KI270438v1", 112505, None),
    ("chrUn_KI270468v1", 4055, None),
    ("chrUn_KI270510v1", 2415, None),
    ("chrUn_KI270509v1", 2318, None),
    ("chrUn_KI270518v1", 2186, None),
    ("chrUn_KI270508v1", 1951, None),
    ("chrUn_KI270516v1", 1300, None),
    ("chrUn_KI270512v1", 22689, None),
    ("chrUn_KI270519v1", 138126, None),
    ("chrUn_KI270522v1", 5674, None),
    ("chrUn_KI270511v1", 8127, None),
    ("chrUn_KI270515v1", 6361, None),
    ("chrUn_KI270507v1", 5353, None),
    ("chrUn_KI270517v1", 3253, None),
    ("chrUn_KI270529v1", 1899, None),
    ("chrUn_KI270528v1", 2983, None),
    ("chrUn_KI270530v1", 2168, None),
    ("chrUn_KI270539v1", 993, None),
    ("chrUn_KI270538v1", 91309, None),
    ("chrUn_KI270544v1", 1202, None),
    ("chrUn_KI270548v1", 1599, None),
    ("chrUn_KI270583v1", 1400, None),
    ("chrUn_KI270587v1", 2969, None),
    ("chrUn_KI270580v1", 1553, None),
    ("chrUn_KI270581v1", 7046, None),
    ("chrUn_KI270579v1", 31033, None),
    ("chrUn_KI270589v1", 44474, None),
    ("chrUn_KI270590v1", 4685, None),
    ("chrUn_KI270584v1", 4513, None),
    ("chrUn_KI270582v1", 6504, None),
    ("chrUn_KI270588v1", 6158, None),
    ("chrUn_KI270593v1", 3041, None),
    ("chrUn_KI270591v1", 5796, None),
    ("chrUn_KI270330v1", 1652, None),
    ("chrUn_KI270329v1", 1040, None),
    ("chrUn_KI270334v1", 1368, None),
    ("chrUn_KI270333v1", 2699, None),
    ("chrUn_KI270335v1", 1048, None),
    ("chrUn_KI270338v1", 1428, None),
    ("chrUn_KI270340v1", 1428, None),
    ("chrUn_KI270336v1", 1026, None),
    ("chrUn_KI270337v1", 1121, None),
    ("chrUn_KI270363v1", 1803, None),
    ("chrUn_KI270364v1", 2855, None),
    ("chrUn_KI270362v1", 3530, None),
    ("chrUn_KI270366v1", 8320, None),
    ("chrUn_KI270378v1", 1048, None),
    ("chrUn_KI270379v1", 1045, None),
    ("chrUn_KI270389v1", 1298, None),
    ("chrUn_KI270390v1", 2387, None),
    ("chrUn_KI270387v1", 1537, None),
    ("chrUn_KI270395v1", 1143, None),
    ("chrUn_KI270396v1", 1880, None),
    ("chrUn_KI270388v1", 1216, None),
    ("chrUn_KI270394v1", 970, None),
    ("chrUn_KI270386v1", 1788, None),
    ("chrUn_KI270391v1", 1484, None),
    ("chrUn_KI270383v1", 1750, None),
    ("chrUn_KI270393v1", 1308, None),
    ("chrUn_KI270384v1", 1658, None),
    ("chrUn_KI270392v1", 971, None),
    ("chrUn_KI270381v1", 1930, None),
    ("chrUn_KI270385v1", 990, None),
    ("chrUn_KI270382v1", 4215, None),
    ("chrUn_KI270376v1", 1136, None),
    ("chrUn_KI270374v1", 2656, None),
    ("chrUn_KI270372v1", 1650, None),
    ("chrUn_KI270373v1", 1451, None),
    ("chrUn_KI270375v1", 2378, None),
    ("chrUn_KI270371v1", 2805, None),
    ("chrUn_KI270448v1", 7992, None),
    ("chrUn_KI270521v1", 7642, None),
    ("chrUn_GL000195v1", 182896, None),
    ("chrUn_GL000219v1", 179198, None),
    ("chrUn_GL000220v1", 161802, None),
    ("chrUn_GL000224v1", 179693, None),
    ("chrUn_KI270741v1", 157432, None),
    ("chrUn_GL000226v1", 15008, None),
    ("chrUn_GL000213v1", 164239, None),
    ("chrUn_KI270743v1", 210658, None),
    ("chrUn_KI270744v1", 168472, None),
    ("chrUn_KI270745v1", 41891, None),
    ("chrUn_KI270746v1", 66486, None),
    ("chrUn_KI270747v1", 198735, None),
    ("chrUn_KI270748v1", 93321, None),
    ("chrUn_KI270749v1", 158759, None),
    ("chrUn_KI270750v1", 148850, None),
    ("chrUn_KI270751v1", 150742, None),
    ("chrUn_KI270752v1", 27745, None),
    ("chrUn_KI270753v1", 62944, None),
    ("chrUn_KI270754v1", 40191, None),
    ("chrUn_KI270755v1", 36723, None),
    ("chrUn_KI270756v1", 79590, None),
    ("chrUn_KI270757v1", 71251, None),
    ("chrUn_GL000214v1", 137718, None),
    ("chrUn_KI270742v1", 186739, None),
    ("chrUn_GL000216v2", 176608, None),
    ("chrUn_GL000218v1", 161147, None),
    ("chrEBV", 171823, Some("6743bd63b3ff2b5b8985d8933c53290a")),
];
