/*!

# Quick start with Google Forms

This example shows how to score a supplier survey end to end, using Google Forms to collect the
answers. Any other form tool works as long as it can export the responses as a spreadsheet.

**Creating the questionnaire** Start the form with the identification questions (company name, email,
address, registration number, contact), then add the CSR questions. Yes/no questions give the clearest
signal: an affirmative answer is worth 1 point, a negative answer 0 point. Open questions are accepted
and count as half a point when they are answered.

**Collecting the answers** In the `Responses` tab, use the `Link to Sheets` option. The spreadsheet has one
row per respondent. The first column is the timestamp, then one column per question, in the order of the form.

**Mapping the columns** Write down the position of each question in the spreadsheet and assign it to a pillar.
This is the `columns` section of the configuration (see the [manual](crate::manual)). If the questionnaire exists
in several languages, each language gets its own section, and every language must cover every pillar.

**Exporting** Download each spreadsheet in the CSV format (`File > Download > Comma Separated Values`) or in the
Excel format.

Run `csrscore`:

```bash
csrscore --config dashboard.json --out public/data.json
```

The responses of a single language can be replaced on the command line:

```bash
csrscore --config dashboard.json --input fr=./exports/reponses.csv --out stdout
```

After running this command, you should see a summary of the scores:

```text
[2024-03-04T09:55:59Z INFO  csrscore::dashboard] Reading responses for fr from "./exports/reponses.csv"
[2024-03-04T09:55:59Z INFO  csrscore::dashboard] fr: 12 respondents scored
[2024-03-04T09:55:59Z INFO  csr_scoring] compute_collective_stats: 12 respondents, 6 pillars
[2024-03-04T09:55:59Z INFO  csrscore::dashboard] 12 suppliers, average score 58.4
[2024-03-04T09:55:59Z INFO  csrscore::dashboard] green: 3 amber: 7 red: 2
```

*/
